//! Error types shared across the ADF crates.
//!
//! Only parsing failures live here; patch and bundle errors belong to the
//! crates that raise them.

use thiserror::Error;

/// A malformed or unsupported version declaration.
///
/// Everything else in the grammar degrades gracefully, so this is the only
/// way parsing can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", line_suffix(.line))]
pub struct ParseError {
    /// Human-readable description.
    pub message: String,
    /// 1-based line number of the offending line, when known.
    pub line: Option<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {n})"),
        None => String::new(),
    }
}

/// Result type alias for parsing.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_when_known() {
        let err = ParseError::at_line("unsupported ADF version '9.9'", 1);
        assert_eq!(err.to_string(), "unsupported ADF version '9.9' (line 1)");
    }

    #[test]
    fn display_without_line() {
        let err = ParseError::new("boom");
        assert_eq!(err.to_string(), "boom");
        assert!(err.line.is_none());
    }
}
