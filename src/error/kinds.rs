use std::{fmt, io};

use super::argument::ArgumentError;

/// Crate-wide `Result` type using [`CmdError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations outside the
/// parsing core, which returns [`ArgumentError`] directly.
pub type Result<T> = std::result::Result<T, CmdError>;

/// Top-level error type for cmdargs operations.
#[derive(Debug)]
pub enum CmdError {
    /// Tokenizing or parsing a command line failed.
    Argument(ArgumentError),

    /// Querying a parse context failed.
    Context(ContextError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Errors raised when reading values back out of a parse context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// No value was recorded under the key.
    Missing(String),

    /// More than one value was recorded where exactly one was required.
    Ambiguous { key: String, count: usize },

    /// The recorded value has a different type than requested.
    TypeMismatch { key: String, expected: &'static str },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Catch-all configuration failure.
    Generic(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for CmdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmdError::Argument(e) => write!(f, "{e}"),
            CmdError::Context(e) => write!(f, "Context error: {e}"),
            CmdError::Config(e) => write!(f, "Configuration error: {e}"),
            CmdError::Io(e) => write!(f, "I/O error: {e}"),
            CmdError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::Missing(key) => write!(f, "No value recorded for '{key}'"),
            ContextError::Ambiguous { key, count } => {
                write!(f, "Expected one value for '{key}', found {count}")
            }
            ContextError::TypeMismatch { key, expected } => {
                write!(f, "Value for '{key}' is not of type {expected}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CmdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CmdError::Argument(e) => Some(e),
            CmdError::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ContextError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to CmdError ========================= */

impl From<ArgumentError> for CmdError {
    fn from(err: ArgumentError) -> Self {
        CmdError::Argument(err)
    }
}

impl From<ContextError> for CmdError {
    fn from(err: ContextError) -> Self {
        CmdError::Context(err)
    }
}

impl From<ConfigError> for CmdError {
    fn from(err: ConfigError) -> Self {
        CmdError::Config(err)
    }
}

impl From<io::Error> for CmdError {
    fn from(err: io::Error) -> Self {
        CmdError::Io(err)
    }
}

impl From<toml::de::Error> for CmdError {
    fn from(err: toml::de::Error) -> Self {
        CmdError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for CmdError {
    fn from(err: toml::ser::Error) -> Self {
        CmdError::Config(ConfigError::Generic(format!("Failed to serialize config: {err}")))
    }
}

impl From<serde_json::Error> for CmdError {
    fn from(err: serde_json::Error) -> Self {
        CmdError::Generic(format!("JSON error: {err}"))
    }
}

impl From<reedline::ReedlineError> for CmdError {
    fn from(err: reedline::ReedlineError) -> Self {
        CmdError::Generic(format!("Line editor error: {err}"))
    }
}

impl From<String> for CmdError {
    fn from(msg: String) -> Self {
        CmdError::Generic(msg)
    }
}

impl From<&str> for CmdError {
    fn from(msg: &str) -> Self {
        CmdError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_argument_error_display_passthrough() {
        let err: CmdError =
            ArgumentError::new(ErrorKind::UnknownChoice, "Argument was not a valid choice", "x", 0)
                .into();
        assert_eq!(err.to_string(), "Argument was not a valid choice");
    }

    #[test]
    fn test_context_error_display() {
        let err = ContextError::Ambiguous {
            key: "player".to_string(),
            count: 2,
        };
        assert_eq!(err.to_string(), "Expected one value for 'player', found 2");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: CmdError = ConfigError::FileNotFound("/nope".into()).into();
        assert_eq!(err.to_string(), "Configuration error: Config file not found: /nope");
    }
}
