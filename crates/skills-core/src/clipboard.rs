//! Clipboard abstraction with a fallback copy path.
//!
//! A copy first goes to the primary clipboard. If that fails the fallback is
//! tried, and if both fail the failure is logged and otherwise swallowed.

use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

pub trait Clipboard {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Which path a copy took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Primary,
    Fallback,
    Failed,
}

impl CopyOutcome {
    /// Status line shown after a copy attempt.
    pub fn message(self) -> &'static str {
        match self {
            Self::Primary => "Copied!",
            Self::Fallback => "Clipboard unavailable; text printed above.",
            Self::Failed => "Failed to copy.",
        }
    }
}

/// Copies `text`, falling back when the primary clipboard fails.
pub fn copy_with_fallback(
    primary: &mut dyn Clipboard,
    fallback: &mut dyn Clipboard,
    text: &str,
) -> CopyOutcome {
    match primary.write_text(text) {
        Ok(()) => {
            debug!(clipboard = primary.name(), bytes = text.len(), "copied");
            return CopyOutcome::Primary;
        }
        Err(e) => {
            warn!(clipboard = primary.name(), error = %e, "primary clipboard failed, trying fallback");
        }
    }

    match fallback.write_text(text) {
        Ok(()) => {
            debug!(clipboard = fallback.name(), bytes = text.len(), "copied with fallback");
            CopyOutcome::Fallback
        }
        Err(e) => {
            error!(clipboard = fallback.name(), error = %e, "failed to copy");
            CopyOutcome::Failed
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Clipboard backed by a string, optionally refusing writes.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryClipboard {
        pub(crate) contents: Option<String>,
        pub(crate) broken: bool,
    }

    impl MemoryClipboard {
        pub(crate) fn broken() -> Self {
            Self {
                contents: None,
                broken: true,
            }
        }
    }

    impl Clipboard for MemoryClipboard {
        fn name(&self) -> &str {
            "memory"
        }

        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.broken {
                return Err(ClipboardError::Unavailable("no clipboard".to_string()));
            }
            self.contents = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn uses_primary_when_it_works() {
        let mut primary = MemoryClipboard::default();
        let mut fallback = MemoryClipboard::default();
        assert_eq!(
            copy_with_fallback(&mut primary, &mut fallback, "hello"),
            CopyOutcome::Primary
        );
        assert_eq!(primary.contents.as_deref(), Some("hello"));
        assert!(fallback.contents.is_none());
    }

    #[test]
    fn falls_back_when_primary_fails() {
        let mut primary = MemoryClipboard::broken();
        let mut fallback = MemoryClipboard::default();
        assert_eq!(
            copy_with_fallback(&mut primary, &mut fallback, "hello"),
            CopyOutcome::Fallback
        );
        assert_eq!(fallback.contents.as_deref(), Some("hello"));
    }

    #[test]
    fn failure_is_reported_not_raised() {
        let mut primary = MemoryClipboard::broken();
        let mut fallback = MemoryClipboard::broken();
        assert_eq!(
            copy_with_fallback(&mut primary, &mut fallback, "hello"),
            CopyOutcome::Failed
        );
    }

    #[test]
    fn failed_copy_has_neutral_message() {
        assert_eq!(CopyOutcome::Failed.message(), "Failed to copy.");
        assert_eq!(CopyOutcome::Primary.message(), "Copied!");
    }
}
