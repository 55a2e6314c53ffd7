use crate::surface::DisplayFilter;
use crate::ui::StyleTokens;
use gtk4::CssProvider;

pub(super) const SURFACE_CSS_CLASS: &str = "anicap-surface";

pub(super) fn install_runtime_css(tokens: StyleTokens) {
    let css = format!(
        "
window.anicap-root {{
  padding: {spacing_16}px;
}}
.anicap-panel {{
  border-radius: {panel_radius}px;
  border: {border_width}px solid rgba(127, 127, 127, 0.3);
  padding: {spacing_12}px;
}}
.anicap-field-error {{
  color: red;
  font-size: smaller;
}}
.anicap-value {{
  font-feature-settings: \"tnum\";
  min-width: 3em;
}}
.anicap-card {{
  border-radius: {card_radius}px;
  border: {border_width}px solid rgba(127, 127, 127, 0.3);
  padding: {spacing_8}px;
}}
.anicap-card button {{
  border-radius: {control_radius}px;
}}
.anicap-empty {{
  opacity: 0.6;
}}
",
        spacing_8 = tokens.spacing_8,
        spacing_12 = tokens.spacing_12,
        spacing_16 = tokens.spacing_16,
        panel_radius = tokens.panel_radius,
        card_radius = tokens.card_radius,
        control_radius = tokens.control_radius,
        border_width = tokens.border_width,
    );

    add_display_provider(&css);
}

fn add_display_provider(css: &str) -> CssProvider {
    let provider = CssProvider::new();
    provider.load_from_data(css);
    if let Some(display) = gtk4::gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
    provider
}

pub(super) fn surface_filter_rule(filter: DisplayFilter) -> String {
    format!(".{SURFACE_CSS_CLASS} {{ filter: {}; }}", filter.css())
}

/// Owns the provider carrying the surface's brightness/contrast rule; only the
/// on-screen widget is filtered, never the surface pixels.
pub(super) struct SurfaceFilterCss {
    provider: CssProvider,
}

impl SurfaceFilterCss {
    pub(super) fn install(initial: DisplayFilter) -> Self {
        Self {
            provider: add_display_provider(&surface_filter_rule(initial)),
        }
    }

    pub(super) fn apply(&self, filter: DisplayFilter) {
        self.provider.load_from_data(&surface_filter_rule(filter));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_filter_rule_targets_surface_class() {
        assert_eq!(
            surface_filter_rule(DisplayFilter::new(0.5, 1.75)),
            ".anicap-surface { filter: brightness(0.50) contrast(1.75); }"
        );
    }
}
