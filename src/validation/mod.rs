pub const MAX_CAPTION_CHARS: usize = 80;
pub const EMPTY_CAPTION_MESSAGE: &str = "Caption cannot be empty.";
pub const CAPTION_TOO_LONG_MESSAGE: &str = "Caption must be under 80 characters.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionValidation {
    pub valid: bool,
    pub message: &'static str,
}

impl CaptionValidation {
    const fn ok() -> Self {
        Self {
            valid: true,
            message: "",
        }
    }

    const fn rejected(message: &'static str) -> Self {
        Self {
            valid: false,
            message,
        }
    }
}

/// Checks the caption rules in order; the first violated rule wins.
pub fn validate_caption(caption: &str) -> CaptionValidation {
    let text = caption.trim();
    if text.is_empty() {
        return CaptionValidation::rejected(EMPTY_CAPTION_MESSAGE);
    }
    if text.chars().count() > MAX_CAPTION_CHARS {
        return CaptionValidation::rejected(CAPTION_TOO_LONG_MESSAGE);
    }
    CaptionValidation::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_captions_are_rejected_as_empty() {
        for caption in ["", " ", "\t\n  ", "\u{3000}"] {
            let result = validate_caption(caption);
            assert!(!result.valid, "{caption:?} should be rejected");
            assert_eq!(result.message, EMPTY_CAPTION_MESSAGE);
        }
    }

    #[test]
    fn caption_over_limit_is_rejected_with_length_message() {
        let caption = "a".repeat(81);
        let result = validate_caption(&caption);
        assert!(!result.valid);
        assert_eq!(result.message, CAPTION_TOO_LONG_MESSAGE);
    }

    #[test]
    fn limit_applies_to_trimmed_text() {
        let caption = format!("   {}   ", "a".repeat(80));
        assert!(validate_caption(&caption).valid);
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let caption = "桜".repeat(80);
        assert!(validate_caption(&caption).valid);
        assert!(!validate_caption(&"桜".repeat(81)).valid);
    }

    #[test]
    fn valid_caption_has_empty_message() {
        let result = validate_caption("Samurai at sunset");
        assert_eq!(result, CaptionValidation::ok());
    }
}
