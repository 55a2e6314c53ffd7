use crate::surface::{format_filter_value, FILTER_DEFAULT, FILTER_MAX, FILTER_MIN, FILTER_STEP};
use crate::ui::StyleTokens;
use crate::validation::MAX_CAPTION_CHARS;
use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, DrawingArea, Entry, FlowBox, Frame, Label, Orientation, Scale,
    ScrolledWindow, SelectionMode,
};

use super::runtime_css::SURFACE_CSS_CLASS;

#[derive(Clone)]
pub(super) struct StudioUi {
    pub(super) root: GtkBox,
    pub(super) surface_area: DrawingArea,
    pub(super) caption_entry: Entry,
    pub(super) caption_error_label: Label,
    pub(super) brightness_scale: Scale,
    pub(super) brightness_value_label: Label,
    pub(super) contrast_scale: Scale,
    pub(super) contrast_value_label: Label,
    pub(super) generate_button: Button,
    pub(super) randomize_button: Button,
    pub(super) clear_gallery_button: Button,
    pub(super) download_button: Button,
    pub(super) save_button: Button,
    pub(super) status_label: Label,
    pub(super) gallery_grid: FlowBox,
}

impl StudioUi {
    pub(super) fn set_status(&self, text: &str, color: &str) {
        let markup = format!(
            "<span foreground=\"{color}\">{}</span>",
            gtk4::glib::markup_escape_text(text)
        );
        self.status_label.set_markup(&markup);
    }

    pub(super) fn set_caption_error(&self, message: &str) {
        self.caption_error_label.set_text(message);
        self.caption_error_label.set_visible(!message.is_empty());
    }
}

fn section_title(text: &str) -> Label {
    let label = Label::new(Some(text));
    label.add_css_class("heading");
    label.set_halign(Align::Start);
    label.set_xalign(0.0);
    label
}

fn panel(tokens: StyleTokens, title: &str, child: &impl IsA<gtk4::Widget>) -> Frame {
    let frame = Frame::new(None);
    frame.add_css_class("anicap-panel");
    let content = GtkBox::new(Orientation::Vertical, tokens.spacing_8);
    content.append(&section_title(title));
    content.append(child);
    frame.set_child(Some(&content));
    frame
}

fn filter_slider(tokens: StyleTokens, name: &str) -> (GtkBox, Scale, Label) {
    let row = GtkBox::new(Orientation::Horizontal, tokens.spacing_8);
    let name_label = Label::new(Some(name));
    name_label.set_xalign(0.0);
    name_label.set_width_chars(10);

    let scale = Scale::with_range(Orientation::Horizontal, FILTER_MIN, FILTER_MAX, FILTER_STEP);
    scale.set_value(FILTER_DEFAULT);
    scale.set_draw_value(false);
    scale.set_width_request(tokens.slider_width);
    scale.set_hexpand(true);
    scale.set_tooltip_text(Some(name));

    let value_label = Label::new(Some(format_filter_value(FILTER_DEFAULT).as_str()));
    value_label.add_css_class("anicap-value");
    value_label.set_xalign(1.0);

    row.append(&name_label);
    row.append(&scale);
    row.append(&value_label);
    (row, scale, value_label)
}

pub(super) fn build_studio_ui(
    tokens: StyleTokens,
    surface_width: i32,
    surface_height: i32,
) -> StudioUi {
    let surface_area = DrawingArea::new();
    surface_area.add_css_class(SURFACE_CSS_CLASS);
    surface_area.set_content_width(surface_width);
    surface_area.set_content_height(surface_height);
    surface_area.set_halign(Align::Center);
    surface_area.set_valign(Align::Start);

    let caption_entry = Entry::new();
    caption_entry.set_placeholder_text(Some("Caption"));
    caption_entry.set_hexpand(true);
    let caption_hint = format!("Up to {MAX_CAPTION_CHARS} characters");
    caption_entry.set_tooltip_text(Some(caption_hint.as_str()));

    let caption_error_label = Label::new(None);
    caption_error_label.add_css_class("anicap-field-error");
    caption_error_label.set_xalign(0.0);
    caption_error_label.set_visible(false);

    let (brightness_row, brightness_scale, brightness_value_label) =
        filter_slider(tokens, "Brightness");
    let (contrast_row, contrast_scale, contrast_value_label) = filter_slider(tokens, "Contrast");

    let generate_button = Button::with_label("Generate");
    generate_button.add_css_class("suggested-action");
    let randomize_button = Button::with_label("Random caption");
    let download_button = Button::with_label("Download");
    let save_button = Button::with_label("Save to gallery");
    let clear_gallery_button = Button::with_label("Clear gallery");
    clear_gallery_button.add_css_class("destructive-action");

    let actions = GtkBox::new(Orientation::Horizontal, tokens.spacing_8);
    for button in [
        &generate_button,
        &randomize_button,
        &download_button,
        &save_button,
        &clear_gallery_button,
    ] {
        actions.append(button);
    }

    let status_label = Label::new(None);
    status_label.set_xalign(0.0);
    status_label.set_wrap(true);

    let controls = GtkBox::new(Orientation::Vertical, tokens.spacing_8);
    controls.append(&caption_entry);
    controls.append(&caption_error_label);
    controls.append(&brightness_row);
    controls.append(&contrast_row);
    controls.append(&actions);
    controls.append(&status_label);
    controls.set_hexpand(true);

    let editor_row = GtkBox::new(Orientation::Horizontal, tokens.spacing_16);
    editor_row.append(&panel(tokens, "Canvas", &surface_area));
    editor_row.append(&panel(tokens, "Controls", &controls));

    let gallery_grid = FlowBox::new();
    gallery_grid.set_selection_mode(SelectionMode::None);
    gallery_grid.set_max_children_per_line(tokens.gallery_columns);
    gallery_grid.set_column_spacing(tokens.spacing_12 as u32);
    gallery_grid.set_row_spacing(tokens.spacing_12 as u32);
    gallery_grid.set_valign(Align::Start);

    let gallery_scroller = ScrolledWindow::new();
    gallery_scroller.set_child(Some(&gallery_grid));
    gallery_scroller.set_vexpand(true);
    gallery_scroller.set_min_content_height(tokens.gallery_thumb_size + tokens.spacing_16 * 3);

    let root = GtkBox::new(Orientation::Vertical, tokens.spacing_16);
    root.append(&editor_row);
    root.append(&panel(tokens, "Gallery", &gallery_scroller));

    StudioUi {
        root,
        surface_area,
        caption_entry,
        caption_error_label,
        brightness_scale,
        brightness_value_label,
        contrast_scale,
        contrast_value_label,
        generate_button,
        randomize_button,
        clear_gallery_button,
        download_button,
        save_button,
        status_label,
        gallery_grid,
    }
}
