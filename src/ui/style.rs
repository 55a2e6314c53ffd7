/// Compile-time layout tokens; not user-overridable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTokens {
    pub spacing_4: i32,
    pub spacing_8: i32,
    pub spacing_12: i32,
    pub spacing_16: i32,
    pub card_radius: u16,
    pub panel_radius: u16,
    pub control_radius: u16,
    pub border_width: u16,
    pub window_default_width: i32,
    pub window_default_height: i32,
    pub slider_width: i32,
    pub gallery_thumb_size: i32,
    pub gallery_columns: u32,
}

pub const LAYOUT_TOKENS: StyleTokens = StyleTokens {
    spacing_4: 4,
    spacing_8: 8,
    spacing_12: 12,
    spacing_16: 16,
    card_radius: 14,
    panel_radius: 18,
    control_radius: 12,
    border_width: 1,
    window_default_width: 1080,
    window_default_height: 760,
    slider_width: 180,
    gallery_thumb_size: 160,
    gallery_columns: 4,
};

#[cfg(test)]
mod tests {
    use super::LAYOUT_TOKENS;

    #[test]
    fn spacing_tokens_increase_in_steps_of_four() {
        let tokens = LAYOUT_TOKENS;
        assert_eq!(tokens.spacing_8 - tokens.spacing_4, 4);
        assert_eq!(tokens.spacing_12 - tokens.spacing_8, 4);
        assert_eq!(tokens.spacing_16 - tokens.spacing_12, 4);
    }

    #[test]
    fn window_fits_default_surface_and_gallery() {
        let tokens = LAYOUT_TOKENS;
        assert!(tokens.window_default_width >= crate::surface::DEFAULT_SURFACE_WIDTH);
        assert!(tokens.gallery_thumb_size > 0);
        assert!(tokens.gallery_columns > 0);
    }
}
