//! Structural elements combining other elements

use std::sync::Arc;

use tracing::{debug, trace};

use super::{ArgumentElement, CompletionStep, Element, Resume, dedup_candidates};
use crate::error::{ArgumentError, ErrorKind};
use crate::parser::context::ParseContext;
use crate::parser::cursor::{ArgCursor, CursorState};
use crate::parser::value::Value;

/// Thread completion resume points through `children` in order.
///
/// Returns the collected candidates and the resume points left after the
/// last child. The cursor is restored to its starting position.
fn thread_completion<'a>(
    children: impl IntoIterator<Item = &'a Element>,
    cursor: &mut ArgCursor,
    context: &ParseContext,
) -> CompletionStep {
    let start = cursor.state();
    let mut candidates = Vec::new();
    let mut frontier = vec![Resume {
        state: start,
        context: context.clone(),
    }];

    for child in children {
        let mut next = CompletionStep::default();
        for Resume { state, mut context } in frontier {
            cursor.set_state(state);
            next.merge(child.complete_step(cursor, &mut context));
        }
        candidates.extend(next.candidates);
        frontier = next.resumes;
        if frontier.is_empty() {
            break;
        }
    }

    cursor.set_state(start);
    frontier.retain(|r| cursor.has_next_at(r.state));
    CompletionStep {
        candidates: dedup_candidates(candidates),
        resumes: frontier,
    }
}

/* ============================ Sequence ============================ */

/// Children parsed in order into the shared context
#[derive(Debug)]
pub struct Sequence {
    children: Vec<Element>,
}

impl ArgumentElement for Sequence {
    fn parse(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Result<(), ArgumentError> {
        for child in &self.children {
            child.parse(cursor, context)?;
        }
        Ok(())
    }

    fn complete(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Vec<String> {
        self.complete_step(cursor, context).candidates
    }

    fn complete_step(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> CompletionStep {
        thread_completion(&self.children, cursor, context)
    }
}

/* ============================ Optional ============================ */

/// Child that may be skipped
#[derive(Debug)]
pub struct Optional {
    child: Element,
    default: Option<Value>,
    weak: bool,
}

impl Optional {
    fn write_default(&self, context: &mut ParseContext) {
        if let (Some(key), Some(default)) = (self.child.key(), &self.default) {
            context.put(key, default.clone());
        }
    }
}

impl ArgumentElement for Optional {
    fn key(&self) -> Option<&str> {
        self.child.key()
    }

    fn parse(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Result<(), ArgumentError> {
        if !cursor.has_next() {
            self.write_default(context);
            return Ok(());
        }

        let start = cursor.state();
        let mark = context.mark();
        match self.child.parse(cursor, context) {
            Ok(()) => Ok(()),
            Err(err) if self.weak || cursor.has_next() => {
                debug!(error = %err, weak = self.weak, "optional argument skipped");
                cursor.set_state(start);
                context.rollback(&mark);
                self.write_default(context);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn complete(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Vec<String> {
        self.complete_step(cursor, context).candidates
    }

    fn complete_step(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> CompletionStep {
        let start = cursor.state();
        let mut skipped = context.clone();
        self.write_default(&mut skipped);
        let skip = Resume {
            state: start,
            context: skipped,
        };
        if !cursor.has_next() {
            return CompletionStep::resume(skip.state, skip.context);
        }

        // Follow the branch parse() takes. An attempt that reaches the final
        // token leaves both branches open: its outcome depends on the
        // candidate substituted there.
        let attempt = self.child.parse(cursor, &mut context.clone());
        let before_final = cursor.has_next();
        cursor.set_state(start);

        match attempt {
            Ok(()) if before_final => self.child.complete_step(cursor, context),
            Err(_) if before_final => CompletionStep::resume(skip.state, skip.context),
            _ => {
                let mut step = self.child.complete_step(cursor, context);
                cursor.set_state(start);
                if self.weak {
                    step.push_resume(skip);
                }
                step
            }
        }
    }
}

/* ============================ FirstParsing ============================ */

/// Ordered alternation: the first child that parses wins
#[derive(Debug)]
pub struct FirstParsing {
    alternatives: Vec<Element>,
}

impl ArgumentElement for FirstParsing {
    fn parse(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Result<(), ArgumentError> {
        let start = cursor.state();
        let mark = context.mark();
        let mut last_error = None;

        for (i, alternative) in self.alternatives.iter().enumerate() {
            match alternative.parse(cursor, context) {
                Ok(()) => {
                    trace!(alternative = i, "alternative parsed");
                    return Ok(());
                }
                Err(err) => {
                    debug!(alternative = i, error = %err, "alternative failed, backtracking");
                    cursor.set_state(start);
                    context.rollback(&mark);
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            cursor.create_error(ErrorKind::MissingRequiredArgument, "No alternatives to parse")
        }))
    }

    fn complete(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Vec<String> {
        self.complete_step(cursor, context).candidates
    }

    fn complete_step(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> CompletionStep {
        let start = cursor.state();
        let mut candidates = Vec::new();
        let mut resumes = Vec::new();

        for alternative in &self.alternatives {
            cursor.set_state(start);
            let step = alternative.complete_step(cursor, &mut context.clone());
            candidates.extend(step.candidates);
            if resumes.is_empty() {
                resumes = step.resumes;
            }
        }

        cursor.set_state(start);
        CompletionStep {
            candidates: dedup_candidates(candidates),
            resumes,
        }
    }
}

/* ============================ Repetition ============================ */

/// Child applied a fixed number of times
#[derive(Debug)]
pub struct Repeated {
    child: Element,
    times: usize,
}

impl ArgumentElement for Repeated {
    fn key(&self) -> Option<&str> {
        self.child.key()
    }

    fn parse(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Result<(), ArgumentError> {
        for _ in 0..self.times {
            self.child.parse(cursor, context)?;
        }
        Ok(())
    }

    fn complete(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Vec<String> {
        self.complete_step(cursor, context).candidates
    }

    fn complete_step(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> CompletionStep {
        thread_completion(std::iter::repeat_n(&self.child, self.times), cursor, context)
    }
}

/// Child applied until the input is exhausted
#[derive(Debug)]
pub struct AllOf {
    child: Element,
}

impl ArgumentElement for AllOf {
    fn key(&self) -> Option<&str> {
        self.child.key()
    }

    fn parse(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Result<(), ArgumentError> {
        while cursor.has_next() {
            let before = cursor.state();
            self.child.parse(cursor, context)?;
            if cursor.state() == before {
                break;
            }
        }
        Ok(())
    }

    fn complete(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Vec<String> {
        self.complete_step(cursor, context).candidates
    }

    fn complete_step(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> CompletionStep {
        let start = cursor.state();
        let mut candidates = Vec::new();
        let mut seen: Vec<CursorState> = vec![start];
        let mut frontier = vec![Resume {
            state: start,
            context: context.clone(),
        }];

        while !frontier.is_empty() {
            let mut next = CompletionStep::default();
            for Resume { state, mut context } in frontier {
                cursor.set_state(state);
                next.merge(self.child.complete_step(cursor, &mut context));
            }
            candidates.extend(next.candidates);
            frontier = next
                .resumes
                .into_iter()
                .filter(|r| !seen.contains(&r.state))
                .collect();
            seen.extend(frontier.iter().map(|r| r.state));
        }

        cursor.set_state(start);
        CompletionStep::candidates(dedup_candidates(candidates))
    }
}

/* ============================ OnlyOne ============================ */

/// Fails if the child's key ends up holding more than one value
#[derive(Debug)]
pub struct OnlyOne {
    child: Element,
}

impl ArgumentElement for OnlyOne {
    fn key(&self) -> Option<&str> {
        self.child.key()
    }

    fn parse(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Result<(), ArgumentError> {
        self.child.parse(cursor, context)?;
        if let Some(key) = self.child.key()
            && context.count(key) > 1
        {
            return Err(cursor.create_error(
                ErrorKind::InvalidValue,
                format!("Argument {key} may have only one value!"),
            ));
        }
        Ok(())
    }

    fn complete(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Vec<String> {
        self.child.complete(cursor, context)
    }

    fn complete_step(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> CompletionStep {
        self.child.complete_step(cursor, context)
    }
}

/* ============================ Constructors ============================ */

/// Parse `children` one after another
pub fn seq(children: impl IntoIterator<Item = Element>) -> Element {
    Arc::new(Sequence {
        children: children.into_iter().collect(),
    })
}

/// Try `alternatives` in order, keeping the first that parses
pub fn first_parsing(alternatives: impl IntoIterator<Item = Element>) -> Element {
    Arc::new(FirstParsing {
        alternatives: alternatives.into_iter().collect(),
    })
}

/// Skippable child. A failure is suppressed only while input remains after
/// the failed attempt.
pub fn optional(child: Element) -> Element {
    Arc::new(Optional {
        child,
        default: None,
        weak: false,
    })
}

/// [`optional`] that writes `default` under the child's key when skipped
pub fn optional_with_default(child: Element, default: impl Into<Value>) -> Element {
    Arc::new(Optional {
        child,
        default: Some(default.into()),
        weak: false,
    })
}

/// Skippable child whose failures are always suppressed, leaving the token
/// for the next element
pub fn optional_weak(child: Element) -> Element {
    Arc::new(Optional {
        child,
        default: None,
        weak: true,
    })
}

/// [`optional_weak`] that writes `default` under the child's key when skipped
pub fn optional_weak_with_default(child: Element, default: impl Into<Value>) -> Element {
    Arc::new(Optional {
        child,
        default: Some(default.into()),
        weak: true,
    })
}

/// Apply `child` exactly `times` times
pub fn repeated(child: Element, times: usize) -> Element {
    Arc::new(Repeated { child, times })
}

/// Apply `child` until no input is left
pub fn all_of(child: Element) -> Element {
    Arc::new(AllOf { child })
}

/// Reject more than one value under the child's key
pub fn only_one(child: Element) -> Element {
    Arc::new(OnlyOne { child })
}
