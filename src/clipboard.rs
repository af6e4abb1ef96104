use std::error::Error;
use std::fmt;

use clipboard::{ClipboardContext, ClipboardProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    Unavailable(String),
    Write(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "Clipboard unavailable: {}", e),
            Self::Write(e) => write!(f, "Clipboard write failed: {}", e),
        }
    }
}

impl Error for ClipboardError {}

/// Best-effort text clipboard.
pub trait ClipboardWriter {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard. The context is opened on first use and kept; if
/// opening fails it is retried on the next copy.
#[derive(Default)]
pub struct SystemClipboard {
    ctx: Option<ClipboardContext>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.ctx.is_none() {
            let ctx: Result<ClipboardContext, _> = ClipboardProvider::new();
            self.ctx = Some(ctx.map_err(|e| ClipboardError::Unavailable(e.to_string()))?);
        }
        match self.ctx.as_mut() {
            Some(ctx) => ctx
                .set_contents(text.to_string())
                .map_err(|e| ClipboardError::Write(e.to_string())),
            None => Err(ClipboardError::Unavailable("no clipboard context".into())),
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    /// Records writes, or refuses them all when `fail` is set.
    #[derive(Debug, Default)]
    pub struct FakeClipboard {
        pub written: Vec<String>,
        pub fail: bool,
    }

    impl FakeClipboard {
        pub fn failing() -> Self {
            Self { written: Vec::new(), fail: true }
        }
    }

    impl ClipboardWriter for FakeClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Write("permission denied".into()));
            }
            self.written.push(text.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeClipboard;
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ClipboardError::Write("denied".into()).to_string(),
            "Clipboard write failed: denied"
        );
        assert_eq!(
            ClipboardError::Unavailable("no display".into()).to_string(),
            "Clipboard unavailable: no display"
        );
    }

    #[test]
    fn test_fake_clipboard() {
        let mut ok = FakeClipboard::default();
        assert!(ok.write_text("a").is_ok());
        assert_eq!(ok.written, vec!["a".to_string()]);

        let mut failing = FakeClipboard::failing();
        assert!(failing.write_text("a").is_err());
        assert!(failing.written.is_empty());
    }
}
