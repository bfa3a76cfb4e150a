//! cmdargs library
//!
//! Tokenizing, parsing and completion of command arguments against a
//! composable grammar. A grammar is built from argument elements (leaves,
//! sequences, optionals, alternatives, repetition and POSIX-style flags),
//! parsed into an ordered multimap of typed values, and completed
//! incrementally from the same description.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and the built-in demo grammar
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `formatter`: Output formatting for contexts, tokens and diagnostics
//! - `parser`: Tokenizer, cursor, parse context and argument elements
//! - `repl`: Interactive REPL engine
//!
//! # Example
//!
//! ```rust
//! use cmdargs::parser::ArgumentParser;
//! use cmdargs::parser::elements::{Flags, integer, string};
//!
//! let parser = ArgumentParser::new(
//!     Flags::builder()
//!         .flag(&["a"])
//!         .value_flag(integer("q"), &["q"])
//!         .build_with(string("key")),
//! );
//!
//! let context = parser.parse("-aq 42 something").unwrap();
//! assert!(context.get_one::<bool>("a").unwrap());
//! assert_eq!(context.get_one::<i32>("q").unwrap(), 42);
//! assert_eq!(context.get_one::<String>("key").unwrap(), "something");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod repl;

// Re-export commonly used types
pub use config::Config;
pub use error::{ArgumentError, CmdError, ErrorKind, Result};
pub use formatter::Formatter;
pub use parser::{ArgumentParser, ParseContext, Tokenizer, Value};
pub use repl::ReplEngine;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
