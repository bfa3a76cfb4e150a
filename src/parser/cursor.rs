//! Positional cursor over argument tokens
//!
//! The cursor is the only mutable state an element touches besides the parse
//! context. Backtracking combinators take a [`CursorState`] before an attempt
//! and restore it afterwards. Restoring is O(1): the state is a view number
//! and an index.
//!
//! Elements that consume tokens out of order (flags interleaved with
//! positionals) splice the tokens they did not use into a new view. Views
//! are append-only, so a state taken before the splice still restores the
//! original token list.

use std::sync::Arc;

use super::tokenizer::ArgumentToken;
use crate::error::{ArgumentError, ErrorKind};

/// Opaque snapshot of a cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorState {
    view: usize,
    index: usize,
}

/// Bidirectional cursor over the tokens of one raw input
#[derive(Debug, Clone)]
pub struct ArgCursor {
    raw: Arc<str>,
    views: Vec<Arc<[ArgumentToken]>>,
    view: usize,
    tokens: Arc<[ArgumentToken]>,
    index: usize,
}

impl ArgCursor {
    /// Create a cursor positioned before the first token
    pub fn new(raw: impl Into<Arc<str>>, tokens: Vec<ArgumentToken>) -> Self {
        Self::over(raw.into(), tokens.into())
    }

    /// Create a cursor over a subset of this cursor's tokens.
    ///
    /// Offsets keep referring to the same raw input.
    pub fn with_tokens(&self, tokens: Vec<ArgumentToken>) -> Self {
        Self::over(Arc::clone(&self.raw), tokens.into())
    }

    fn over(raw: Arc<str>, tokens: Arc<[ArgumentToken]>) -> Self {
        Self {
            raw,
            views: vec![Arc::clone(&tokens)],
            view: 0,
            tokens,
            index: 0,
        }
    }

    /// Replace everything after `from` with `rest` and move to `from`.
    ///
    /// Tokens before `from` stay reachable through [`previous`](Self::previous).
    /// `from` must be a state of the current view.
    pub fn splice_remaining(&mut self, from: CursorState, rest: Vec<ArgumentToken>) {
        let keep = from.index.min(self.tokens.len());
        let tokens: Arc<[ArgumentToken]> = self.tokens[..keep]
            .iter()
            .cloned()
            .chain(rest)
            .collect();
        self.views.push(Arc::clone(&tokens));
        self.view = self.views.len() - 1;
        self.tokens = tokens;
        self.index = keep;
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    /// Return the current token value and advance past it
    pub fn next(&mut self) -> Result<String, ArgumentError> {
        self.next_token().map(|t| t.value().to_string())
    }

    /// Like [`next`](Self::next), returning the whole token
    pub fn next_token(&mut self) -> Result<ArgumentToken, ArgumentError> {
        let token = self.current_token()?.clone();
        self.index += 1;
        Ok(token)
    }

    /// Non-failing [`next`](Self::next)
    pub fn next_if_present(&mut self) -> Option<String> {
        self.next().ok()
    }

    /// Return the current token value without advancing
    pub fn peek(&self) -> Result<String, ArgumentError> {
        self.current_token().map(|t| t.value().to_string())
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// Step back one token and return its value.
    ///
    /// `next()` followed by `previous()` restores the position and yields the
    /// same value.
    pub fn previous(&mut self) -> Result<String, ArgumentError> {
        if !self.has_previous() {
            return Err(ArgumentError::new(
                ErrorKind::NoPreviousArgument,
                "No previous argument",
                Arc::clone(&self.raw),
                0,
            ));
        }
        self.index -= 1;
        Ok(self.tokens[self.index].value().to_string())
    }

    /// All token values, independent of the cursor position
    pub fn all(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.value()).collect()
    }

    pub fn tokens(&self) -> &[ArgumentToken] {
        &self.tokens
    }

    /// Tokens not consumed yet
    pub fn remaining_tokens(&self) -> &[ArgumentToken] {
        &self.tokens[self.index..]
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens not consumed yet
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.index
    }

    /// Offset of the current token, or the end of the input when exhausted
    pub fn current_raw_position(&self) -> usize {
        self.tokens
            .get(self.index)
            .map(ArgumentToken::start)
            .unwrap_or(self.raw.len())
    }

    /// The raw input from the current position to the end
    pub fn raw_args_from_current_position(&self) -> &str {
        &self.raw[self.current_raw_position()..]
    }

    pub fn state(&self) -> CursorState {
        CursorState {
            view: self.view,
            index: self.index,
        }
    }

    pub fn set_state(&mut self, state: CursorState) {
        if state.view != self.view
            && let Some(tokens) = self.views.get(state.view)
        {
            self.view = state.view;
            self.tokens = Arc::clone(tokens);
        }
        self.index = state.index.min(self.tokens.len());
    }

    /// Whether a token is left to read from `state`
    pub fn has_next_at(&self, state: CursorState) -> bool {
        self.views
            .get(state.view)
            .is_some_and(|tokens| state.index < tokens.len())
    }

    /// Build an error anchored at the most recently consumed token
    pub fn create_error(&self, kind: ErrorKind, message: impl Into<String>) -> ArgumentError {
        ArgumentError::new(kind, message, Arc::clone(&self.raw), self.error_position())
    }

    /// Like [`create_error`](Self::create_error), recording the cause
    pub fn create_error_with_cause(
        &self,
        kind: ErrorKind,
        message: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> ArgumentError {
        self.create_error(kind, message).with_cause(cause)
    }

    /// Build an error anchored at the end of the input
    pub fn create_end_error(&self, kind: ErrorKind, message: impl Into<String>) -> ArgumentError {
        ArgumentError::new(kind, message, Arc::clone(&self.raw), self.raw.len())
    }

    fn current_token(&self) -> Result<&ArgumentToken, ArgumentError> {
        self.tokens
            .get(self.index)
            .ok_or_else(|| self.create_end_error(ErrorKind::NoMoreArguments, "Not enough arguments"))
    }

    fn error_position(&self) -> usize {
        match self.index.checked_sub(1) {
            Some(last) => self.tokens[last].start(),
            None => self.tokens.first().map(ArgumentToken::start).unwrap_or(0),
        }
    }
}
