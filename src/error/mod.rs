//! Error handling for command argument parsing.
//!
//! This module provides:
//! - [`ArgumentError`], the structured, position-anchored error raised by the
//!   tokenizer, the cursor and every argument element
//! - [`ErrorReport`], a serializable view of an argument error for JSON output
//! - [`CmdError`], the crate-level error wrapping argument, context,
//!   configuration and I/O failures
//!
//! # Example
//!
//! ```rust
//! use cmdargs::error::{ArgumentError, ErrorKind};
//!
//! let err = ArgumentError::new(ErrorKind::TypeConversion, "Expected an integer", "give abc", 5);
//! assert_eq!(err.annotated(), "Expected an integer\ngive abc\n     ^");
//! ```

pub mod argument;
pub mod kinds;

// Re-export commonly used types
pub use argument::{ArgumentError, ErrorKind, ErrorReport};
pub use kinds::{CmdError, ConfigError, ContextError, Result};
