//! Leaf elements: single values read from the cursor
//!
//! Most leaves are a key plus a [`ValueParser`] wrapped in [`Leaf`]. The
//! parser converts tokens into a [`Value`]; the leaf handles the
//! missing-input check, writes the value under its key and restricts
//! completion to the final token.

use std::fmt;
use std::num::ParseIntError;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use super::{ArgumentElement, Element};
use crate::error::{ArgumentError, ErrorKind};
use crate::parser::context::ParseContext;
use crate::parser::cursor::ArgCursor;
use crate::parser::value::Value;

const TRUE_WORDS: [&str; 6] = ["true", "t", "y", "yes", "verymuchso", "1"];
const FALSE_WORDS: [&str; 6] = ["false", "f", "n", "no", "notatall", "0"];

/// Converts tokens into a value.
///
/// This is the extension point for converters that live outside this crate
/// (player names, world names, ...). Wrap an implementation with [`leaf`].
pub trait ValueParser: Send + Sync + fmt::Debug {
    /// Read one value from the cursor. The cursor has at least one token
    /// left when this is called.
    fn parse_value(&self, cursor: &mut ArgCursor) -> Result<Value, ArgumentError>;

    /// Suggestions for a partially typed token
    fn complete_value(&self, _prefix: &str) -> Vec<String> {
        Vec::new()
    }
}

/// A keyed element backed by a [`ValueParser`]
#[derive(Debug)]
pub struct Leaf {
    key: String,
    parser: Box<dyn ValueParser>,
}

impl Leaf {
    pub fn new(key: impl Into<String>, parser: impl ValueParser + 'static) -> Self {
        Self {
            key: key.into(),
            parser: Box::new(parser),
        }
    }
}

impl ArgumentElement for Leaf {
    fn key(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn parse(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Result<(), ArgumentError> {
        if !cursor.has_next() {
            return Err(missing_argument(cursor));
        }
        let value = self.parser.parse_value(cursor)?;
        trace!(key = %self.key, %value, "parsed argument");
        context.put(self.key.as_str(), value);
        Ok(())
    }

    fn complete(&self, cursor: &mut ArgCursor, _context: &mut ParseContext) -> Vec<String> {
        let Some(prefix) = cursor.next_if_present() else {
            return Vec::new();
        };
        if cursor.has_next() {
            return Vec::new();
        }
        self.parser.complete_value(&prefix)
    }
}

fn missing_argument(cursor: &ArgCursor) -> ArgumentError {
    cursor.create_end_error(ErrorKind::MissingRequiredArgument, "Not enough arguments")
}

/* ============================ Value parsers ============================ */

#[derive(Debug)]
struct StringParser;

impl ValueParser for StringParser {
    fn parse_value(&self, cursor: &mut ArgCursor) -> Result<Value, ArgumentError> {
        cursor.next().map(Value::Text)
    }
}

#[derive(Debug, Clone, Copy)]
enum IntegerWidth {
    I32,
    I64,
}

#[derive(Debug)]
struct IntegerParser {
    width: IntegerWidth,
}

/// Parse an integer with an optional `0x` (hex) or `0b` (binary) prefix
fn parse_prefixed<T>(
    input: &str,
    from_radix: fn(&str, u32) -> Result<T, ParseIntError>,
) -> Result<T, ParseIntError> {
    if let Some(hex) = input.strip_prefix("0x") {
        from_radix(hex, 16)
    } else if let Some(bin) = input.strip_prefix("0b") {
        from_radix(bin, 2)
    } else {
        from_radix(input, 10)
    }
}

impl ValueParser for IntegerParser {
    fn parse_value(&self, cursor: &mut ArgCursor) -> Result<Value, ArgumentError> {
        let input = cursor.next()?;
        let (parsed, what) = match self.width {
            IntegerWidth::I32 => (
                parse_prefixed(&input, i32::from_str_radix).map(i64::from),
                "an integer",
            ),
            IntegerWidth::I64 => (parse_prefixed(&input, i64::from_str_radix), "a long"),
        };
        parsed.map(Value::Integer).map_err(|err| {
            cursor.create_error_with_cause(
                ErrorKind::TypeConversion,
                format!("Expected {what}, but input '{input}' was not"),
                err,
            )
        })
    }
}

#[derive(Debug)]
struct DoubleParser;

impl ValueParser for DoubleParser {
    fn parse_value(&self, cursor: &mut ArgCursor) -> Result<Value, ArgumentError> {
        let input = cursor.next()?;
        input.parse::<f64>().map(Value::Float).map_err(|err| {
            cursor.create_error_with_cause(
                ErrorKind::TypeConversion,
                format!("Expected input {input} to be a double, but was not"),
                err,
            )
        })
    }
}

#[derive(Debug)]
struct ChoicesParser {
    choices: IndexMap<String, Value>,
    case_insensitive: bool,
}

impl ChoicesParser {
    fn normalize<'a>(&self, input: &'a str) -> std::borrow::Cow<'a, str> {
        if self.case_insensitive {
            input.to_lowercase().into()
        } else {
            input.into()
        }
    }
}

impl ValueParser for ChoicesParser {
    fn parse_value(&self, cursor: &mut ArgCursor) -> Result<Value, ArgumentError> {
        let input = cursor.next()?;
        match self.choices.get(self.normalize(&input).as_ref()) {
            Some(value) => Ok(value.clone()),
            None => {
                let valid: Vec<&str> = self.choices.keys().map(String::as_str).collect();
                Err(cursor.create_error(
                    ErrorKind::UnknownChoice,
                    format!(
                        "Argument was not a valid choice. Valid choices: [{}]",
                        valid.join(", ")
                    ),
                ))
            }
        }
    }

    fn complete_value(&self, prefix: &str) -> Vec<String> {
        let prefix = self.normalize(prefix);
        self.choices
            .keys()
            .filter(|choice| choice.starts_with(prefix.as_ref()))
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
struct RemainingJoinedParser {
    raw: bool,
}

impl ValueParser for RemainingJoinedParser {
    fn parse_value(&self, cursor: &mut ArgCursor) -> Result<Value, ArgumentError> {
        if self.raw {
            let joined = cursor.raw_args_from_current_position().to_string();
            while cursor.has_next() {
                cursor.next()?;
            }
            return Ok(Value::Text(joined));
        }

        let mut joined = cursor.next()?;
        while let Some(next) = cursor.next_if_present() {
            joined.push(' ');
            joined.push_str(&next);
        }
        Ok(Value::Text(joined))
    }
}

/* ============================ Keyless and literal elements ============================ */

/// Element that consumes nothing and records nothing
#[derive(Debug)]
pub struct NoneElement;

impl ArgumentElement for NoneElement {
    fn parse(&self, _cursor: &mut ArgCursor, _context: &mut ParseContext) -> Result<(), ArgumentError> {
        Ok(())
    }

    fn complete(&self, _cursor: &mut ArgCursor, _context: &mut ParseContext) -> Vec<String> {
        Vec::new()
    }
}

/// Records `true` under its key without consuming input
#[derive(Debug)]
pub struct MarkTrue {
    key: String,
}

impl ArgumentElement for MarkTrue {
    fn key(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn parse(&self, _cursor: &mut ArgCursor, context: &mut ParseContext) -> Result<(), ArgumentError> {
        context.put(self.key.as_str(), true);
        Ok(())
    }

    fn complete(&self, _cursor: &mut ArgCursor, _context: &mut ParseContext) -> Vec<String> {
        Vec::new()
    }
}

/// Matches a fixed run of words, case-insensitively
#[derive(Debug)]
pub struct Literal {
    key: String,
    value: Value,
    words: Vec<String>,
}

impl ArgumentElement for Literal {
    fn key(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn parse(&self, cursor: &mut ArgCursor, context: &mut ParseContext) -> Result<(), ArgumentError> {
        for expected in &self.words {
            if !cursor.has_next() {
                return Err(missing_argument(cursor));
            }
            let current = cursor.next()?;
            if current.to_lowercase() != expected.to_lowercase() {
                return Err(cursor.create_error(
                    ErrorKind::UnknownChoice,
                    format!("Argument {current} did not match expected next argument {expected}"),
                ));
            }
        }
        context.put(self.key.as_str(), self.value.clone());
        Ok(())
    }

    fn complete(&self, cursor: &mut ArgCursor, _context: &mut ParseContext) -> Vec<String> {
        for expected in &self.words {
            let Some(current) = cursor.next_if_present() else {
                break;
            };
            let current = current.to_lowercase();
            let expected_lower = expected.to_lowercase();
            if cursor.has_next() {
                if current != expected_lower {
                    break;
                }
            } else if expected_lower.starts_with(&current) {
                return vec![expected.clone()];
            }
        }
        Vec::new()
    }
}

/* ============================ Constructors ============================ */

/// Wrap a custom [`ValueParser`] as a keyed element
pub fn leaf(key: impl Into<String>, parser: impl ValueParser + 'static) -> Element {
    Arc::new(Leaf::new(key, parser))
}

/// Accepts no input
pub fn none() -> Element {
    Arc::new(NoneElement)
}

/// Records `true` under `key` without consuming input
pub fn mark_true(key: impl Into<String>) -> Element {
    Arc::new(MarkTrue { key: key.into() })
}

/// One token as a string
pub fn string(key: impl Into<String>) -> Element {
    leaf(key, StringParser)
}

/// A 32-bit integer; accepts `0x` and `0b` prefixes
pub fn integer(key: impl Into<String>) -> Element {
    leaf(
        key,
        IntegerParser {
            width: IntegerWidth::I32,
        },
    )
}

/// A 64-bit integer; accepts `0x` and `0b` prefixes
pub fn long_num(key: impl Into<String>) -> Element {
    leaf(
        key,
        IntegerParser {
            width: IntegerWidth::I64,
        },
    )
}

pub fn double_num(key: impl Into<String>) -> Element {
    leaf(key, DoubleParser)
}

/// A boolean written as one of `true t y yes verymuchso 1` or
/// `false f n no notatall 0`
pub fn boolean(key: impl Into<String>) -> Element {
    let choices = TRUE_WORDS
        .iter()
        .map(|w| (w.to_string(), Value::Bool(true)))
        .chain(FALSE_WORDS.iter().map(|w| (w.to_string(), Value::Bool(false))))
        .collect();
    choices_map(key, choices, false)
}

/// One token out of a fixed, case-sensitive set of choices
pub fn choices<K, V>(key: impl Into<String>, choices: impl IntoIterator<Item = (K, V)>) -> Element
where
    K: Into<String>,
    V: Into<Value>,
{
    let choices = choices
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    choices_map(key, choices, false)
}

/// Like [`choices`], ignoring case. Choice names are stored lowercased.
pub fn choices_insensitive<K, V>(
    key: impl Into<String>,
    choices: impl IntoIterator<Item = (K, V)>,
) -> Element
where
    K: Into<String>,
    V: Into<Value>,
{
    let choices = choices
        .into_iter()
        .map(|(k, v)| (k.into().to_lowercase(), v.into()))
        .collect();
    choices_map(key, choices, true)
}

fn choices_map(key: impl Into<String>, choices: IndexMap<String, Value>, case_insensitive: bool) -> Element {
    leaf(
        key,
        ChoicesParser {
            choices,
            case_insensitive,
        },
    )
}

/// One of a set of variant names, matched case-insensitively.
///
/// Records the variant name as declared.
pub fn enum_value(key: impl Into<String>, names: &[&str]) -> Element {
    choices_insensitive(key, names.iter().map(|name| (*name, *name)))
}

/// All remaining tokens joined with single spaces
pub fn remaining_joined_strings(key: impl Into<String>) -> Element {
    leaf(key, RemainingJoinedParser { raw: false })
}

/// The raw input from the current token to the end, quoting and spacing
/// intact
pub fn remaining_raw_joined_strings(key: impl Into<String>) -> Element {
    leaf(key, RemainingJoinedParser { raw: true })
}

/// Expect `words` in order and record `true` under `key`
pub fn literal(key: impl Into<String>, words: &[&str]) -> Element {
    literal_with_value(key, true, words)
}

/// Expect `words` in order and record `value` under `key`
pub fn literal_with_value(key: impl Into<String>, value: impl Into<Value>, words: &[&str]) -> Element {
    Arc::new(Literal {
        key: key.into(),
        value: value.into(),
        words: words.iter().map(|w| w.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Tokenizer;

    fn run(element: &Element, input: &str) -> Result<ParseContext, ArgumentError> {
        let tokens = Tokenizer::LenientQuoted.tokenize(input, false)?;
        let mut cursor = ArgCursor::new(input, tokens);
        let mut context = ParseContext::new();
        element.parse(&mut cursor, &mut context)?;
        Ok(context)
    }

    fn complete(element: &Element, input: &str) -> Vec<String> {
        let tokens = Tokenizer::LenientQuoted.tokenize(input, true).unwrap();
        let mut cursor = ArgCursor::new(input, tokens);
        element.complete(&mut cursor, &mut ParseContext::new())
    }

    #[test]
    fn test_string_leaf() {
        let ctx = run(&string("key"), "\"two words\"").unwrap();
        assert_eq!(ctx.get_one::<String>("key").unwrap(), "two words");
    }

    #[test]
    fn test_missing_input() {
        let err = run(&string("key"), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.message(), "Not enough arguments");
    }

    #[test]
    fn test_integer_radix_prefixes() {
        let el = integer("n");
        assert_eq!(run(&el, "0x1F").unwrap().get_one::<i64>("n").unwrap(), 31);
        assert_eq!(run(&el, "0b101").unwrap().get_one::<i64>("n").unwrap(), 5);
        assert_eq!(run(&el, "-12").unwrap().get_one::<i64>("n").unwrap(), -12);
    }

    #[test]
    fn test_integer_errors() {
        let err = run(&integer("n"), "abc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeConversion);
        assert_eq!(err.message(), "Expected an integer, but input 'abc' was not");
        assert!(err.cause().is_some());

        let err = run(&integer("n"), "3000000000").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeConversion);

        let ctx = run(&long_num("n"), "3000000000").unwrap();
        assert_eq!(ctx.get_one::<i64>("n").unwrap(), 3_000_000_000);
    }

    #[test]
    fn test_double() {
        let ctx = run(&double_num("d"), "2.5").unwrap();
        assert_eq!(ctx.get_one::<f64>("d").unwrap(), 2.5);
        let err = run(&double_num("d"), "x").unwrap_err();
        assert_eq!(err.message(), "Expected input x to be a double, but was not");
    }

    #[test]
    fn test_boolean_words() {
        let el = boolean("b");
        for word in ["true", "t", "y", "yes", "verymuchso", "1"] {
            assert!(run(&el, word).unwrap().get_one::<bool>("b").unwrap());
        }
        for word in ["false", "f", "n", "no", "notatall", "0"] {
            assert!(!run(&el, word).unwrap().get_one::<bool>("b").unwrap());
        }
        assert_eq!(run(&el, "maybe").unwrap_err().kind(), ErrorKind::UnknownChoice);
    }

    #[test]
    fn test_choices_case_sensitive() {
        let el = choices("order", [("asc", "asc"), ("desc", "desc")]);
        assert_eq!(
            run(&el, "desc").unwrap().get_one::<String>("order").unwrap(),
            "desc"
        );
        let err = run(&el, "ASC").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownChoice);
        assert_eq!(
            err.message(),
            "Argument was not a valid choice. Valid choices: [asc, desc]"
        );
        assert_eq!(complete(&el, "d"), vec!["desc"]);
        assert_eq!(complete(&el, ""), vec!["asc", "desc"]);
    }

    #[test]
    fn test_enum_value_ignores_case() {
        let el = enum_value("mode", &["Survival", "Creative"]);
        let ctx = run(&el, "CREATIVE").unwrap();
        assert_eq!(ctx.get_one::<String>("mode").unwrap(), "Creative");
        assert_eq!(complete(&el, "Su"), vec!["survival"]);
    }

    #[test]
    fn test_remaining_joined() {
        let ctx = run(&remaining_joined_strings("msg"), "hello   big \"wide world\"").unwrap();
        assert_eq!(ctx.get_one::<String>("msg").unwrap(), "hello big wide world");

        let ctx = run(&remaining_raw_joined_strings("msg"), "hello   \"wide world\"").unwrap();
        assert_eq!(ctx.get_one::<String>("msg").unwrap(), "hello   \"wide world\"");
    }

    #[test]
    fn test_literal_multi_word() {
        let el = literal("cmd", &["give", "me"]);
        assert!(run(&el, "GIVE me").unwrap().get_one::<bool>("cmd").unwrap());

        let err = run(&el, "give you").unwrap_err();
        assert_eq!(err.message(), "Argument you did not match expected next argument me");
        assert_eq!(err.position(), 5);

        assert_eq!(complete(&el, "gi"), vec!["give"]);
        assert_eq!(complete(&el, "give m"), vec!["me"]);
        assert!(complete(&el, "take m").is_empty());
    }

    #[test]
    fn test_leaf_completes_final_token_only() {
        let el = boolean("b");
        assert_eq!(complete(&el, "y"), vec!["y", "yes"]);
        assert!(complete(&el, "y n").is_empty());
    }

    #[test]
    fn test_mark_true_and_none() {
        let ctx = run(&mark_true("flag"), "").unwrap();
        assert!(ctx.get_one::<bool>("flag").unwrap());
        assert!(run(&none(), "").unwrap().is_empty());
    }
}
