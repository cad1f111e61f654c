//! Non-fatal problems found while reading JSONL data.
//!
//! A [`Warning`] means one line was skipped; it never aborts the read. Callers
//! decide whether to surface warnings to users, log them, or both.

use std::fmt;

/// A non-fatal warning produced during resilient JSONL reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A non-empty line could not be decoded into the requested record type.
    MalformedJson {
        /// The 1-based line number of the offending line.
        line_number: usize,
        /// The decoder's error message.
        error: String,
    },

    /// A line was skipped before decoding was attempted.
    SkippedLine {
        /// The 1-based line number that was skipped.
        line_number: usize,
        /// Why the line was skipped.
        reason: String,
    },
}

impl Warning {
    /// Returns the line number associated with this warning.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. } | Self::SkippedLine { line_number, .. } => {
                *line_number
            }
        }
    }

    /// Short machine-readable name of the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: malformed JSON: {error}")
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => write!(f, "line {line_number}: skipped: {reason}"),
        }
    }
}

impl std::error::Error for Warning {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_message() {
        let warning = Warning::MalformedJson {
            line_number: 7,
            error: "expected value".to_string(),
        };
        assert_eq!(warning.to_string(), "line 7: malformed JSON: expected value");
        assert_eq!(warning.line_number(), 7);
        assert_eq!(warning.kind(), "malformed_json");
    }

    #[test]
    fn skipped_line_kind() {
        let warning = Warning::SkippedLine {
            line_number: 2,
            reason: "invalid UTF-8".to_string(),
        };
        assert_eq!(warning.kind(), "skipped_line");
        assert!(warning.to_string().contains("invalid UTF-8"));
    }
}
