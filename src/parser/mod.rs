//! Command argument parser
//!
//! This module turns one raw command string into a [`ParseContext`] of typed
//! values, and offers completions for a partially typed command.
//!
//! # Architecture
//!
//! The parser is split into multiple focused modules:
//! - `tokenizer`: raw string to [`ArgumentToken`]s, under a quoting policy
//! - `cursor`: positional cursor over tokens with O(1) snapshot/restore
//! - `context`: ordered multimap of recorded values
//! - `value`: the [`Value`] type stored in the context
//! - `elements`: leaves, combinators and flags that make up a grammar
//!
//! # Examples
//!
//! ```rust
//! use cmdargs::parser::ArgumentParser;
//! use cmdargs::parser::elements::{integer, literal, optional_weak_with_default, seq};
//!
//! let parser = ArgumentParser::new(seq([
//!     literal("list", &["list"]),
//!     optional_weak_with_default(integer("limit"), 10),
//! ]));
//!
//! let context = parser.parse("list 5").unwrap();
//! assert_eq!(context.get_one::<i32>("limit").unwrap(), 5);
//!
//! let context = parser.parse("list").unwrap();
//! assert_eq!(context.get_one::<i32>("limit").unwrap(), 10);
//!
//! assert_eq!(parser.complete("li"), vec!["list"]);
//! ```

pub mod context;
pub mod cursor;
pub mod elements;
pub mod tokenizer;
pub mod value;

// Re-export public API
pub use context::{ContextMark, ParseContext};
pub use cursor::{ArgCursor, CursorState};
pub use elements::{ArgumentElement, Element};
pub use tokenizer::{ArgumentToken, Tokenizer};
pub use value::{FromValue, Value};

use tracing::debug;

use crate::error::{ArgumentError, ErrorKind};

/// A grammar bound to a tokenizer policy
///
/// The parser itself is immutable; every call builds a fresh cursor and
/// context, so one parser can be shared freely.
#[derive(Debug, Clone)]
pub struct ArgumentParser {
    element: Element,
    tokenizer: Tokenizer,
}

impl ArgumentParser {
    /// Create a parser for `element` using the lenient quoted tokenizer
    pub fn new(element: Element) -> Self {
        Self {
            element,
            tokenizer: Tokenizer::default(),
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn tokenizer(&self) -> Tokenizer {
        self.tokenizer
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Split `input` into tokens with this parser's policy
    pub fn tokenize(&self, input: &str) -> Result<Vec<ArgumentToken>, ArgumentError> {
        self.tokenizer.tokenize(input, false)
    }

    /// Parse a whole command line
    ///
    /// # Arguments
    ///
    /// * `input` - The raw argument string
    ///
    /// # Returns
    ///
    /// * `Result<ParseContext, ArgumentError>` - The recorded values, or the
    ///   first failure. Input left over after the grammar finishes is a
    ///   `TooManyArguments` error.
    pub fn parse(&self, input: &str) -> Result<ParseContext, ArgumentError> {
        debug!(input, tokenizer = %self.tokenizer, "parsing arguments");
        let tokens = self.tokenize(input)?;
        let mut cursor = ArgCursor::new(input, tokens);
        let mut context = ParseContext::new();

        self.element.parse(&mut cursor, &mut context)?;

        if cursor.has_next() {
            cursor.next()?;
            return Err(cursor.create_error(ErrorKind::TooManyArguments, "Too many arguments"));
        }
        debug!(keys = context.len(), "parsed arguments");
        Ok(context)
    }

    /// Completion candidates for the final token of `input`
    ///
    /// A trailing space means the final token is empty, so the candidates
    /// are for the next argument.
    pub fn complete(&self, input: &str) -> Vec<String> {
        let tokens = match self.tokenizer.tokenize(input, true) {
            Ok(tokens) => tokens,
            Err(err) => {
                debug!(error = %err, "tokenizing for completion failed");
                return Vec::new();
            }
        };
        let mut cursor = ArgCursor::new(input, tokens);
        let candidates = self.element.complete(&mut cursor, &mut ParseContext::new());
        let candidates = elements::dedup_candidates(candidates);
        debug!(input, count = candidates.len(), "completed arguments");
        candidates
    }

    /// Completion for a line editor
    ///
    /// # Arguments
    ///
    /// * `line` - The full line in the editor
    /// * `pos` - Byte offset of the caret
    ///
    /// # Returns
    ///
    /// * `(usize, Vec<String>)` - Byte offset where the replaced token starts,
    ///   and the candidates to replace it with, quoted for the tokenizer
    pub fn complete_line(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let mut pos = pos.min(line.len());
        while !line.is_char_boundary(pos) {
            pos -= 1;
        }
        let before = &line[..pos];

        let start = self
            .tokenizer
            .tokenize(before, true)
            .ok()
            .and_then(|tokens| tokens.last().map(ArgumentToken::start))
            .unwrap_or(pos);
        let candidates = self
            .complete(before)
            .into_iter()
            .map(|candidate| self.tokenizer.quote(&candidate).into_owned())
            .collect();
        (start, candidates)
    }
}
