//! Short and long flags wrapped around a positional element
//!
//! A [`Flags`] element scans its input for `-abc` short flag groups,
//! `--name` long flags and `--name=value` pairs. Flags may appear before,
//! between or after the positional tokens of the wrapped child; the child
//! parses the positional tokens as if the flags had never been typed.
//!
//! ```rust
//! use cmdargs::parser::elements::{Flags, integer, string};
//! use cmdargs::parser::ArgumentParser;
//!
//! let element = Flags::builder()
//!     .flag(&["a"])
//!     .value_flag(integer("quot"), &["q"])
//!     .build_with(string("key"));
//! let parser = ArgumentParser::new(element);
//!
//! let context = parser.parse("-a something -q 42").unwrap();
//! assert_eq!(context.get_one::<i32>("quot").unwrap(), 42);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::leaf::{mark_true, none, string};
use super::{ArgumentElement, CompletionStep, Element, speculative_step};
use crate::error::{ArgumentError, ErrorKind};
use crate::parser::context::ParseContext;
use crate::parser::cursor::ArgCursor;
use crate::parser::tokenizer::ArgumentToken;
use crate::parser::value::Value;

/// What to do with a flag that has no definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownFlagPolicy {
    /// Fail with an unknown flag error
    #[default]
    Error,
    /// Skip the flag without recording anything
    Ignore,
    /// Record `true` under the flag name
    AcceptNonvalue,
    /// Record the following token under the flag name
    AcceptValue,
}

impl UnknownFlagPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownFlagPolicy::Error => "error",
            UnknownFlagPolicy::Ignore => "ignore",
            UnknownFlagPolicy::AcceptNonvalue => "accept-nonvalue",
            UnknownFlagPolicy::AcceptValue => "accept-value",
        }
    }
}

impl fmt::Display for UnknownFlagPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnknownFlagPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "error" => Ok(UnknownFlagPolicy::Error),
            "ignore" => Ok(UnknownFlagPolicy::Ignore),
            "accept-nonvalue" => Ok(UnknownFlagPolicy::AcceptNonvalue),
            "accept-value" => Ok(UnknownFlagPolicy::AcceptValue),
            other => Err(format!("unknown flag policy '{other}'")),
        }
    }
}

/// One flag with all the names it answers to
#[derive(Debug, Clone)]
pub struct FlagDefinition {
    short_names: Vec<char>,
    long_names: Vec<String>,
    element: Element,
    takes_value: bool,
}

impl FlagDefinition {
    pub fn short_names(&self) -> &[char] {
        &self.short_names
    }

    /// Long names, lowercased
    pub fn long_names(&self) -> &[String] {
        &self.long_names
    }

    /// Element run when the flag is seen: `mark_true` for plain flags, the
    /// value element for value flags
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn takes_value(&self) -> bool {
        self.takes_value
    }

    /// Context key the flag records under
    pub fn key(&self) -> Option<&str> {
        self.element.key()
    }
}

/// Classification of a single token
enum FlagToken<'a> {
    Long { name: &'a str, value: Option<&'a str> },
    Short(&'a str),
    Positional,
}

fn classify(token: &str) -> FlagToken<'_> {
    if let Some(rest) = token.strip_prefix("--") {
        if rest.is_empty() {
            return FlagToken::Positional;
        }
        return match rest.split_once('=') {
            Some((name, value)) => FlagToken::Long {
                name,
                value: Some(value),
            },
            None => FlagToken::Long {
                name: rest,
                value: None,
            },
        };
    }
    match token.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => FlagToken::Short(rest),
        _ => FlagToken::Positional,
    }
}

/// Flags wrapped around a child element. Build with [`Flags::builder`].
#[derive(Debug)]
pub struct Flags {
    child: Element,
    definitions: Vec<FlagDefinition>,
    short: IndexMap<char, usize>,
    long: IndexMap<String, usize>,
    unknown_short: UnknownFlagPolicy,
    unknown_long: UnknownFlagPolicy,
    anchored: bool,
}

impl Flags {
    pub fn builder() -> FlagsBuilder {
        FlagsBuilder::default()
    }

    pub fn definitions(&self) -> &[FlagDefinition] {
        &self.definitions
    }

    fn long_definition(&self, name: &str) -> Option<&FlagDefinition> {
        self.long
            .get(&name.to_lowercase())
            .map(|&i| &self.definitions[i])
    }

    fn short_definition(&self, name: char) -> Option<&FlagDefinition> {
        self.short.get(&name).map(|&i| &self.definitions[i])
    }

    fn parse_long(
        &self,
        name: &str,
        inline: Option<&str>,
        token: &ArgumentToken,
        cursor: &mut ArgCursor,
        context: &mut ParseContext,
    ) -> Result<(), ArgumentError> {
        trace!(flag = name, value = inline, "long flag");
        match (self.long_definition(name), inline) {
            (Some(definition), None) => definition.element.parse(cursor, context),
            (Some(definition), Some(value)) => {
                let mut value_cursor = inline_value_cursor(cursor, token, value);
                definition.element.parse(&mut value_cursor, context)
            }
            (None, _) => match self.unknown_long {
                UnknownFlagPolicy::Error => Err(cursor.create_error(
                    ErrorKind::UnknownFlag,
                    format!("Unknown long flag {name} specified"),
                )),
                UnknownFlagPolicy::Ignore => Ok(()),
                UnknownFlagPolicy::AcceptNonvalue => {
                    context.put(name, inline.map(Value::from).unwrap_or(Value::Bool(true)));
                    Ok(())
                }
                UnknownFlagPolicy::AcceptValue => match inline {
                    Some(value) => {
                        context.put(name, value);
                        Ok(())
                    }
                    None => string(name).parse(cursor, context),
                },
            },
        }
    }

    fn parse_short(
        &self,
        group: &str,
        cursor: &mut ArgCursor,
        context: &mut ParseContext,
    ) -> Result<(), ArgumentError> {
        for flag in group.chars() {
            trace!(%flag, "short flag");
            if let Some(definition) = self.short_definition(flag) {
                definition.element.parse(cursor, context)?;
                continue;
            }
            match self.unknown_short {
                UnknownFlagPolicy::Error => {
                    return Err(cursor.create_error(
                        ErrorKind::UnknownFlag,
                        format!("Unknown short flag {flag} specified"),
                    ));
                }
                UnknownFlagPolicy::Ignore => {}
                UnknownFlagPolicy::AcceptNonvalue => context.put(flag.to_string(), true),
                UnknownFlagPolicy::AcceptValue => string(flag.to_string()).parse(cursor, context)?,
            }
        }
        Ok(())
    }

    /// Complete the value of a flag that was just read.
    ///
    /// Returns `None` when the value was parsed and input remains, so the
    /// scan continues.
    fn complete_value(
        &self,
        definition: &FlagDefinition,
        cursor: &mut ArgCursor,
        context: &mut ParseContext,
    ) -> Option<Vec<String>> {
        let before = cursor.state();
        let mut scratch = context.clone();
        if definition.element.parse(cursor, &mut scratch).is_ok() && cursor.has_next() {
            *context = scratch;
            return None;
        }
        cursor.set_state(before);
        Some(definition.element.complete(cursor, context))
    }

    /// Consume the value of an unknown flag under `AcceptValue`.
    ///
    /// Returns `true` when that value is the final token.
    fn skip_unknown_value(&self, policy: UnknownFlagPolicy, cursor: &mut ArgCursor) -> bool {
        policy == UnknownFlagPolicy::AcceptValue
            && cursor.next_if_present().is_some()
            && !cursor.has_next()
    }

    fn complete_long_names(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        self.long
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .map(|name| format!("--{name}"))
            .collect()
    }

    fn complete_inline_value(
        &self,
        name: &str,
        partial: &str,
        token: &ArgumentToken,
        cursor: &ArgCursor,
        context: &ParseContext,
    ) -> Vec<String> {
        let Some(definition) = self.long_definition(name) else {
            return Vec::new();
        };
        let mut value_cursor = inline_value_cursor(cursor, token, partial);
        definition
            .element
            .complete(&mut value_cursor, &mut context.clone())
            .into_iter()
            .map(|candidate| format!("--{name}={candidate}"))
            .collect()
    }
}

/// One-token cursor over the value part of `--name=value`
fn inline_value_cursor(cursor: &ArgCursor, token: &ArgumentToken, value: &str) -> ArgCursor {
    let source = &cursor.raw()[token.start()..token.end()];
    let start = if source == token.value() {
        token.end() - value.len()
    } else {
        token.start()
    };
    cursor.with_tokens(vec![ArgumentToken::new(value, start, token.end())])
}

impl ArgumentElement for Flags {
    fn parse(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Result<(), ArgumentError> {
        let start = cursor.state();
        let mut positional = Vec::new();

        while cursor.has_next() {
            let token = cursor.next_token()?;
            match classify(token.value()) {
                FlagToken::Long { name, value } => {
                    self.parse_long(name, value, &token, cursor, context)?
                }
                FlagToken::Short(group) => self.parse_short(group, cursor, context)?,
                FlagToken::Positional if self.anchored => {
                    cursor.previous()?;
                    break;
                }
                FlagToken::Positional => positional.push(token),
            }
        }

        if self.anchored {
            return self.child.parse(cursor, context);
        }

        let mut child_cursor = cursor.with_tokens(positional);
        let result = self.child.parse(&mut child_cursor, context);

        // Hand leftover positionals back without the recorded flag tokens
        if child_cursor.has_next() {
            let leftover = child_cursor.remaining_tokens().to_vec();
            cursor.splice_remaining(start, leftover);
        }
        result
    }

    fn complete(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Vec<String> {
        let mut positional = Vec::new();

        while let Ok(token) = cursor.next_token() {
            let is_final = !cursor.has_next();
            match classify(token.value()) {
                FlagToken::Positional if is_final && token.value() == "--" => {
                    return self.complete_long_names("");
                }
                FlagToken::Positional if self.anchored => {
                    let _ = cursor.previous();
                    return self.child.complete(cursor, context);
                }
                FlagToken::Positional => positional.push(token),
                FlagToken::Long { name, value: None } if is_final => {
                    return self.complete_long_names(name);
                }
                FlagToken::Long {
                    name,
                    value: Some(partial),
                } if is_final => {
                    return self.complete_inline_value(name, partial, &token, cursor, context);
                }
                FlagToken::Long { name, value } => match self.long_definition(name) {
                    Some(definition) if value.is_none() => {
                        if let Some(candidates) = self.complete_value(definition, cursor, context) {
                            return candidates;
                        }
                    }
                    Some(_) => {}
                    None if value.is_none() => {
                        if self.skip_unknown_value(self.unknown_long, cursor) {
                            return Vec::new();
                        }
                    }
                    None => {}
                },
                FlagToken::Short(_) if is_final => return Vec::new(),
                FlagToken::Short(group) => {
                    for flag in group.chars() {
                        match self.short_definition(flag) {
                            Some(definition) => {
                                if let Some(candidates) =
                                    self.complete_value(definition, cursor, context)
                                {
                                    return candidates;
                                }
                            }
                            None => {
                                if self.skip_unknown_value(self.unknown_short, cursor) {
                                    return Vec::new();
                                }
                            }
                        }
                    }
                }
            }
        }

        let mut child_cursor = cursor.with_tokens(positional);
        self.child.complete(&mut child_cursor, context)
    }

    fn complete_step(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> CompletionStep {
        let ends_with_dashes = !self.anchored
            && cursor
                .remaining_tokens()
                .last()
                .is_some_and(|token| token.value() == "--");
        let mut step = speculative_step(self, cursor, context);

        // A final `--` handed back to the next element may still start a flag
        if ends_with_dashes && !step.resumes.is_empty() {
            step.candidates.extend(self.complete_long_names(""));
        }
        step
    }
}

/// Builder for [`Flags`]
#[derive(Debug, Default)]
pub struct FlagsBuilder {
    definitions: Vec<FlagDefinition>,
    short: IndexMap<char, usize>,
    long: IndexMap<String, usize>,
    unknown_short: UnknownFlagPolicy,
    unknown_long: UnknownFlagPolicy,
    anchored: bool,
}

impl FlagsBuilder {
    /// Add a flag without a value.
    ///
    /// A spec starting with `-` is a long name (`"-help"` is `--help`);
    /// any other spec is a group of one-character short names. The flag
    /// records `true` under its first name.
    pub fn flag(self, specs: &[&str]) -> Self {
        let Some(key) = specs.first().and_then(|spec| first_name(spec)) else {
            return self;
        };
        self.add(mark_true(key), specs, false)
    }

    /// Add a flag whose value is parsed by `element`; the value is recorded
    /// under the element's key
    pub fn value_flag(self, element: Element, specs: &[&str]) -> Self {
        self.add(element, specs, true)
    }

    pub fn unknown_short_flags(mut self, policy: UnknownFlagPolicy) -> Self {
        self.unknown_short = policy;
        self
    }

    pub fn unknown_long_flags(mut self, policy: UnknownFlagPolicy) -> Self {
        self.unknown_long = policy;
        self
    }

    /// Record unknown long flags as `true`
    pub fn accept_arbitrary_long_flags(self) -> Self {
        self.unknown_long_flags(UnknownFlagPolicy::AcceptNonvalue)
    }

    /// Stop looking for flags at the first positional token
    pub fn anchor_flags(mut self, anchored: bool) -> Self {
        self.anchored = anchored;
        self
    }

    pub fn build_with(self, child: Element) -> Element {
        Arc::new(Flags {
            child,
            definitions: self.definitions,
            short: self.short,
            long: self.long,
            unknown_short: self.unknown_short,
            unknown_long: self.unknown_long,
            anchored: self.anchored,
        })
    }

    /// Flags with nothing positional after them
    pub fn build(self) -> Element {
        self.build_with(none())
    }

    fn add(mut self, element: Element, specs: &[&str], takes_value: bool) -> Self {
        let index = self.definitions.len();
        let mut definition = FlagDefinition {
            short_names: Vec::new(),
            long_names: Vec::new(),
            element,
            takes_value,
        };

        for spec in specs {
            if let Some(long) = spec.strip_prefix('-') {
                let name = long.to_lowercase();
                self.long.insert(name.clone(), index);
                definition.long_names.push(name);
            } else {
                for short in spec.chars() {
                    self.short.insert(short, index);
                    definition.short_names.push(short);
                }
            }
        }

        self.definitions.push(definition);
        self
    }
}

fn first_name(spec: &str) -> Option<String> {
    match spec.strip_prefix('-') {
        Some(long) if !long.is_empty() => Some(long.to_string()),
        Some(_) => None,
        None => spec.chars().next().map(String::from),
    }
}
