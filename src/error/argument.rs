use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Maximum number of characters shown on either side of the caret in
/// [`ArgumentError::annotated`].
const ANNOTATION_WINDOW: usize = 40;

/// Category of an argument parsing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unterminated quote under the strict quoting policy.
    Tokenize,
    /// `next()`/`peek()` called on an exhausted cursor.
    NoMoreArguments,
    /// `previous()` called at the start of the input.
    NoPreviousArgument,
    /// A leaf could not convert its token.
    TypeConversion,
    /// Token did not match any of a fixed set of choices.
    UnknownChoice,
    /// Flag not defined and the unknown-flag policy is `Error`.
    UnknownFlag,
    /// A required element found no input left.
    MissingRequiredArgument,
    /// Input remained after the root element finished.
    TooManyArguments,
    /// Structurally invalid value, such as a repeated single-valued key.
    InvalidValue,
}

impl ErrorKind {
    /// Stable identifier used in JSON reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Tokenize => "tokenize",
            ErrorKind::NoMoreArguments => "no_more_arguments",
            ErrorKind::NoPreviousArgument => "no_previous_argument",
            ErrorKind::TypeConversion => "type_conversion",
            ErrorKind::UnknownChoice => "unknown_choice",
            ErrorKind::UnknownFlag => "unknown_flag",
            ErrorKind::MissingRequiredArgument => "missing_required_argument",
            ErrorKind::TooManyArguments => "too_many_arguments",
            ErrorKind::InvalidValue => "invalid_value",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable parse outcome anchored to a position in the raw input.
///
/// Every failure raised by the tokenizer, the cursor and the argument
/// elements is an `ArgumentError`. It keeps the raw string and the byte
/// offset of the offending token so callers can render caret diagnostics.
#[derive(Debug)]
pub struct ArgumentError {
    kind: ErrorKind,
    message: String,
    raw: Arc<str>,
    position: usize,
    cause: Option<Box<dyn StdError + Send + Sync>>,
}

impl ArgumentError {
    /// Create a new error. `position` is clamped to the raw string length.
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        raw: impl Into<Arc<str>>,
        position: usize,
    ) -> Self {
        let raw = raw.into();
        let position = position.min(raw.len());
        Self {
            kind,
            message: message.into(),
            raw,
            position,
            cause: None,
        }
    }

    /// Attach the underlying error that triggered this one.
    pub fn with_cause(mut self, cause: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The full raw input the error refers to.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Byte offset into [`raw`](Self::raw).
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync)> {
        self.cause.as_deref()
    }

    /// Render the message followed by the input and a caret under the
    /// error position.
    ///
    /// Long inputs are cut to a window around the caret, marked with `...`.
    pub fn annotated(&self) -> String {
        let before: Vec<char> = self.raw[..self.position].chars().collect();
        let after: Vec<char> = self.raw[self.position..].chars().collect();

        let head_start = before.len().saturating_sub(ANNOTATION_WINDOW);
        let tail_end = after.len().min(ANNOTATION_WINDOW);

        let mut line = String::new();
        if head_start > 0 {
            line.push_str("...");
        }
        line.extend(&before[head_start..]);
        let caret_column = line.chars().count();
        line.extend(&after[..tail_end]);
        if tail_end < after.len() {
            line.push_str("...");
        }

        format!(
            "{}\n{}\n{}^",
            self.message,
            line,
            " ".repeat(caret_column)
        )
    }

    /// Serializable view of this error.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind,
            message: self.message.clone(),
            input: self.raw.to_string(),
            position: self.position,
            cause: self.cause.as_ref().map(|c| c.to_string()),
        }
    }
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for ArgumentError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn StdError + 'static))
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub input: String,
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ErrorReport {
    /// Convert the report to pretty-printed JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert the report to compact JSON (single line).
    pub fn to_json_compact(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotated_caret_position() {
        let err = ArgumentError::new(ErrorKind::TypeConversion, "Expected an integer", "give abc", 5);
        assert_eq!(err.annotated(), "Expected an integer\ngive abc\n     ^");
    }

    #[test]
    fn test_position_is_clamped() {
        let err = ArgumentError::new(ErrorKind::NoMoreArguments, "Not enough arguments", "ab", 10);
        assert_eq!(err.position(), 2);
        assert!(err.annotated().ends_with("\n  ^"));
    }

    #[test]
    fn test_annotated_window_for_long_input() {
        let raw = format!("{} target", "x".repeat(100));
        let err = ArgumentError::new(ErrorKind::UnknownChoice, "bad", raw.as_str(), 101);
        let annotated = err.annotated();
        let lines: Vec<&str> = annotated.lines().collect();
        assert!(lines[1].starts_with("..."));
        let caret = lines[2].find('^').unwrap();
        assert_eq!(&lines[1][caret..caret + 6], "target");
    }

    #[test]
    fn test_cause_is_exposed_as_source() {
        let cause = "12x".parse::<i32>().unwrap_err();
        let err = ArgumentError::new(ErrorKind::TypeConversion, "bad int", "12x", 0).with_cause(cause);
        assert!(err.source().is_some());
        assert!(err.report().cause.is_some());
    }

    #[test]
    fn test_report_json() {
        let err = ArgumentError::new(ErrorKind::UnknownFlag, "Unknown long flag x", "--x", 0);
        let json = err.report().to_json_compact().unwrap();
        assert!(json.contains("\"kind\":\"unknown_flag\""));
        assert!(!json.contains("cause"));
    }
}
