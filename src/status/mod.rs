const INFO_COLOR: &str = "#666666";
const ERROR_COLOR: &str = "red";

pub const READY_STATUS: &str = "Ready!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusLevel {
    #[default]
    Info,
    Error,
}

impl StatusLevel {
    pub const fn color(self) -> &'static str {
        match self {
            Self::Info => INFO_COLOR,
            Self::Error => ERROR_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

/// Holds the single line shown in the status region. Only the last message survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReporter {
    current: StatusMessage,
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self {
            current: StatusMessage::info(READY_STATUS),
        }
    }
}

impl StatusReporter {
    pub fn set(&mut self, text: impl Into<String>, is_error: bool) {
        self.current = if is_error {
            StatusMessage::error(text)
        } else {
            StatusMessage::info(text)
        };
        if self.current.is_error() {
            tracing::warn!(status = %self.current.text, "status error");
        } else {
            tracing::debug!(status = %self.current.text, "status updated");
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.set(text, false);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set(text, true);
    }

    pub fn current(&self) -> &StatusMessage {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_starts_ready_as_info() {
        let reporter = StatusReporter::default();
        assert_eq!(reporter.current(), &StatusMessage::info("Ready!"));
    }

    #[test]
    fn reporter_keeps_only_last_message_and_its_level() {
        let mut reporter = StatusReporter::default();
        reporter.error("No image to download.");
        assert!(reporter.current().is_error());
        assert_eq!(reporter.current().level.color(), "red");

        reporter.info("Saved to gallery.");
        assert_eq!(reporter.current().text, "Saved to gallery.");
        assert_eq!(reporter.current().level.color(), "#666666");
    }
}
