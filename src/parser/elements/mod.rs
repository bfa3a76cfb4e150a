//! Argument elements: the composable grammar of a command's arguments
//!
//! Every element is an immutable descriptor implementing
//! [`ArgumentElement`]. Elements are shared as [`Element`]
//! (`Arc<dyn ArgumentElement>`) so one grammar can serve any number of
//! concurrent parses; all per-parse state lives in the [`ArgCursor`] and the
//! [`ParseContext`] handed to each call.
//!
//! # Completion
//!
//! Completion runs as a sequence of steps. [`ArgumentElement::complete_step`]
//! returns the candidates an element offers for the final token together
//! with the [`Resume`] points at which the element finished without reaching
//! the final token. Containers thread those resume points through their
//! children, so a sequence offers candidates from every branch that is still
//! reachable given the tokens typed so far.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use super::context::ParseContext;
use super::cursor::{ArgCursor, CursorState};
use crate::error::ArgumentError;

pub mod combinators;
pub mod flags;
pub mod leaf;

pub use combinators::{
    AllOf, FirstParsing, OnlyOne, Optional, Repeated, Sequence, all_of, first_parsing, only_one,
    optional, optional_weak, optional_weak_with_default, optional_with_default, repeated, seq,
};
pub use flags::{FlagDefinition, Flags, FlagsBuilder, UnknownFlagPolicy};
pub use leaf::{
    Leaf, Literal, MarkTrue, NoneElement, ValueParser, boolean, choices, choices_insensitive,
    double_num, enum_value, integer, leaf, literal, literal_with_value, long_num, mark_true, none,
    remaining_joined_strings, remaining_raw_joined_strings, string,
};

/// Shared handle to an argument element
pub type Element = Arc<dyn ArgumentElement>;

/// A unit of argument grammar
pub trait ArgumentElement: Send + Sync + fmt::Debug {
    /// Context key this element writes under, if any
    fn key(&self) -> Option<&str> {
        None
    }

    /// Consume tokens from `cursor` and record values in `context`.
    ///
    /// On failure the cursor position and the context are left wherever the
    /// element stopped; callers that retry restore them.
    fn parse(&self, cursor: &mut ArgCursor, context: &mut ParseContext)
    -> Result<(), ArgumentError>;

    /// Candidates for the final token of the input, given that this element
    /// starts reading at the cursor's position.
    fn complete(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Vec<String>;

    /// One completion step.
    ///
    /// The default parses the element speculatively: success with input left
    /// over yields a resume point, anything else falls back to
    /// [`complete`](Self::complete). The cursor is back at its starting
    /// position when this returns.
    fn complete_step(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> CompletionStep {
        speculative_step(self, cursor, context)
    }
}

/// The default [`ArgumentElement::complete_step`]
pub fn speculative_step<E: ArgumentElement + ?Sized>(
    element: &E,
    cursor: &mut ArgCursor,
    context: &mut ParseContext,
) -> CompletionStep {
    let start = cursor.state();
    let mut forked = context.clone();
    let parsed = element.parse(cursor, &mut forked);

    let step = if parsed.is_ok() && cursor.has_next() {
        CompletionStep::resume(cursor.state(), forked)
    } else {
        cursor.set_state(start);
        CompletionStep::candidates(element.complete(cursor, context))
    };
    cursor.set_state(start);
    step
}

/// Point from which the next element continues completing
#[derive(Debug, Clone)]
pub struct Resume {
    pub state: CursorState,
    pub context: ParseContext,
}

/// Outcome of [`ArgumentElement::complete_step`]
#[derive(Debug, Clone, Default)]
pub struct CompletionStep {
    pub candidates: Vec<String>,
    pub resumes: Vec<Resume>,
}

impl CompletionStep {
    pub fn candidates(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            resumes: Vec::new(),
        }
    }

    pub fn resume(state: CursorState, context: ParseContext) -> Self {
        Self {
            candidates: Vec::new(),
            resumes: vec![Resume { state, context }],
        }
    }

    /// Add a resume point unless one already exists for the same state
    pub fn push_resume(&mut self, resume: Resume) {
        if !self.resumes.iter().any(|r| r.state == resume.state) {
            self.resumes.push(resume);
        }
    }

    /// Fold `other` into this step, keeping the first resume per state
    pub fn merge(&mut self, other: CompletionStep) {
        self.candidates.extend(other.candidates);
        for resume in other.resumes {
            self.push_resume(resume);
        }
    }
}

/// Remove duplicate candidates, keeping first-seen order
pub fn dedup_candidates(candidates: Vec<String>) -> Vec<String> {
    candidates
        .into_iter()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
