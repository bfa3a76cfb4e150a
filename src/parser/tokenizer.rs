//! Command line tokenizer
//!
//! Splits a raw command string into [`ArgumentToken`]s, each carrying its
//! unescaped value and the byte span it was read from.
//!
//! # Grammar
//!
//! - `ESCAPE` is a backslash followed by any character, which is taken literally
//! - `QUOTE` is `'` or `"`; a quoted segment runs to the matching quote and may
//!   contain whitespace and escapes
//! - an argument is a run of plain characters, escapes and quoted segments up
//!   to the next unquoted whitespace, so `a"b c"d` reads as `ab cd`
//!
//! The [`Tokenizer`] policy decides how much of that grammar applies and how
//! an unterminated quote is treated.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ArgumentError, ErrorKind};

/// One lexical unit of the raw input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgumentToken {
    value: String,
    start: usize,
    end: usize,
}

impl ArgumentToken {
    /// Create a new token spanning `start..end` of the raw input
    pub fn new(value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            value: value.into(),
            start,
            end,
        }
    }

    /// Unescaped token text
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Byte offset of the first character of the token (including quotes)
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset one past the last character of the token
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Tokenizing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tokenizer {
    /// Quotes and escapes; an unterminated quote runs to the end of input
    #[default]
    LenientQuoted,
    /// Quotes and escapes; an unterminated quote is an error unless completing
    StrictQuoted,
    /// The whole input is a single token
    Raw,
    /// Split on whitespace only, no quoting or escaping
    SpaceSplit,
}

impl Tokenizer {
    /// Tokenize `input`.
    ///
    /// With `for_completion` set, an unterminated quote is always tolerated
    /// and an input that is empty or ends in whitespace gets a trailing empty
    /// token, so the next argument has a target to complete.
    pub fn tokenize(
        &self,
        input: &str,
        for_completion: bool,
    ) -> Result<Vec<ArgumentToken>, ArgumentError> {
        let mut tokens = match self {
            Tokenizer::LenientQuoted => QuotedLexer::new(input, true).tokenize()?,
            Tokenizer::StrictQuoted => QuotedLexer::new(input, for_completion).tokenize()?,
            Tokenizer::Raw => {
                if input.is_empty() {
                    Vec::new()
                } else {
                    vec![ArgumentToken::new(input, 0, input.len())]
                }
            }
            Tokenizer::SpaceSplit => split_whitespace(input),
        };

        if for_completion {
            let wants_trailing = match self {
                Tokenizer::Raw => tokens.is_empty(),
                _ => tokens.last().is_none_or(|t| t.end() < input.len()),
            };
            if wants_trailing {
                tokens.push(ArgumentToken::new("", input.len(), input.len()));
            }
        }

        Ok(tokens)
    }

    /// Render `value` so that this policy reads it back as one token.
    ///
    /// Quoting policies wrap values holding whitespace, quotes or backslashes
    /// in double quotes. `Raw` and `SpaceSplit` have no quoting and return
    /// the value unchanged.
    pub fn quote<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let needs_quotes = value.is_empty()
            || value
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
        match self {
            Tokenizer::LenientQuoted | Tokenizer::StrictQuoted if needs_quotes => {
                let mut quoted = String::with_capacity(value.len() + 2);
                quoted.push('"');
                for c in value.chars() {
                    if matches!(c, '"' | '\\') {
                        quoted.push('\\');
                    }
                    quoted.push(c);
                }
                quoted.push('"');
                Cow::Owned(quoted)
            }
            _ => Cow::Borrowed(value),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tokenizer::LenientQuoted => "lenient-quoted",
            Tokenizer::StrictQuoted => "strict-quoted",
            Tokenizer::Raw => "raw",
            Tokenizer::SpaceSplit => "space-split",
        }
    }
}

impl fmt::Display for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tokenizer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient-quoted" | "lenient" => Ok(Tokenizer::LenientQuoted),
            "strict-quoted" | "strict" => Ok(Tokenizer::StrictQuoted),
            "raw" => Ok(Tokenizer::Raw),
            "space-split" | "space" => Ok(Tokenizer::SpaceSplit),
            other => Err(format!(
                "Unknown tokenizer '{other}'. Expected one of: lenient-quoted, strict-quoted, raw, space-split"
            )),
        }
    }
}

/// Quote- and escape-aware lexer
struct QuotedLexer<'a> {
    raw: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    lenient: bool,
}

impl<'a> QuotedLexer<'a> {
    fn new(raw: &'a str, lenient: bool) -> Self {
        Self {
            raw,
            chars: raw.char_indices().collect(),
            pos: 0,
            lenient,
        }
    }

    fn tokenize(mut self) -> Result<Vec<ArgumentToken>, ArgumentError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.scan_argument()?);
        }

        Ok(tokens)
    }

    /// Scan one argument up to unquoted whitespace
    fn scan_argument(&mut self) -> Result<ArgumentToken, ArgumentError> {
        let start = self.offset();
        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();
            match ch {
                c if c.is_whitespace() => break,
                '\'' | '"' => self.scan_quoted(ch, &mut value)?,
                '\\' => self.scan_escape(&mut value),
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        Ok(ArgumentToken::new(value, start, self.offset()))
    }

    /// Scan a quoted segment, appending its contents to `value`
    fn scan_quoted(&mut self, quote: char, value: &mut String) -> Result<(), ArgumentError> {
        let quote_start = self.offset();
        self.advance(); // Skip opening quote

        loop {
            if self.is_at_end() {
                if self.lenient {
                    return Ok(());
                }
                return Err(ArgumentError::new(
                    ErrorKind::Tokenize,
                    "Unterminated quoted string",
                    self.raw,
                    quote_start,
                ));
            }

            let ch = self.current_char();
            if ch == quote {
                self.advance();
                return Ok(());
            }
            if ch == '\\' {
                self.scan_escape(value);
            } else {
                value.push(ch);
                self.advance();
            }
        }
    }

    /// Scan a backslash escape; a trailing lone backslash is kept as-is
    fn scan_escape(&mut self, value: &mut String) {
        self.advance(); // Skip backslash
        if self.is_at_end() {
            value.push('\\');
        } else {
            value.push(self.current_char());
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn current_char(&self) -> char {
        self.chars.get(self.pos).map(|&(_, c)| c).unwrap_or('\0')
    }

    /// Byte offset of the current position
    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(i, _)| i)
            .unwrap_or(self.raw.len())
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

/// Split on whitespace runs, keeping byte spans
fn split_whitespace(input: &str) -> Vec<ArgumentToken> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, ch) in input.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push(ArgumentToken::new(&input[s..i], s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(ArgumentToken::new(&input[s..], s, input.len()));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(tokens: &[ArgumentToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.value()).collect()
    }

    #[test]
    fn test_plain_arguments_with_spans() {
        let tokens = Tokenizer::LenientQuoted.tokenize("a b c", false).unwrap();
        assert_eq!(values(&tokens), vec!["a", "b", "c"]);
        assert_eq!(tokens[0].span(), 0..1);
        assert_eq!(tokens[1].span(), 2..3);
        assert_eq!(tokens[2].span(), 4..5);
    }

    #[test]
    fn test_quoted_argument() {
        let tokens = Tokenizer::LenientQuoted.tokenize("\"a b\" c", false).unwrap();
        assert_eq!(values(&tokens), vec!["a b", "c"]);
        assert_eq!(tokens[0].span(), 0..5);
        assert_eq!(tokens[1].span(), 6..7);
    }

    #[test]
    fn test_single_quotes_keep_double_quotes() {
        let tokens = Tokenizer::LenientQuoted.tokenize("'say \"hi\"' x", false).unwrap();
        assert_eq!(values(&tokens), vec!["say \"hi\"", "x"]);
    }

    #[test]
    fn test_escaped_space() {
        let tokens = Tokenizer::LenientQuoted.tokenize("a\\ b c", false).unwrap();
        assert_eq!(values(&tokens), vec!["a b", "c"]);
        assert_eq!(tokens[0].span(), 0..4);
    }

    #[test]
    fn test_escape_inside_quotes() {
        let tokens = Tokenizer::LenientQuoted.tokenize(r#""a \" b""#, false).unwrap();
        assert_eq!(values(&tokens), vec!["a \" b"]);
    }

    #[test]
    fn test_adjacent_segments_join() {
        let tokens = Tokenizer::LenientQuoted.tokenize("a\"b c\"d e", false).unwrap();
        assert_eq!(values(&tokens), vec!["ab cd", "e"]);
    }

    #[test]
    fn test_trailing_backslash_is_literal() {
        let tokens = Tokenizer::LenientQuoted.tokenize("a\\", false).unwrap();
        assert_eq!(values(&tokens), vec!["a\\"]);
    }

    #[test]
    fn test_lenient_unterminated_quote() {
        let tokens = Tokenizer::LenientQuoted.tokenize("\"unclosed", false).unwrap();
        assert_eq!(values(&tokens), vec!["unclosed"]);
        assert_eq!(tokens[0].span(), 0..9);
    }

    #[test]
    fn test_strict_unterminated_quote_fails() {
        let err = Tokenizer::StrictQuoted.tokenize("ok \"unclosed", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Tokenize);
        assert_eq!(err.position(), 3);
    }

    #[test]
    fn test_strict_unterminated_quote_tolerated_for_completion() {
        let tokens = Tokenizer::StrictQuoted.tokenize("\"unclosed", true).unwrap();
        assert_eq!(values(&tokens), vec!["unclosed"]);
    }

    #[test]
    fn test_trailing_whitespace() {
        let tokens = Tokenizer::LenientQuoted.tokenize("a b  ", false).unwrap();
        assert_eq!(values(&tokens), vec!["a", "b"]);

        let tokens = Tokenizer::LenientQuoted.tokenize("a b  ", true).unwrap();
        assert_eq!(values(&tokens), vec!["a", "b", ""]);
        assert_eq!(tokens[2].span(), 5..5);

        // Whitespace inside an open quote belongs to the last token
        let tokens = Tokenizer::LenientQuoted.tokenize("a \"b ", true).unwrap();
        assert_eq!(values(&tokens), vec!["a", "b "]);
    }

    #[test]
    fn test_empty_input() {
        assert!(Tokenizer::LenientQuoted.tokenize("", false).unwrap().is_empty());
        assert!(Tokenizer::LenientQuoted.tokenize("   ", false).unwrap().is_empty());

        let tokens = Tokenizer::LenientQuoted.tokenize("", true).unwrap();
        assert_eq!(values(&tokens), vec![""]);
    }

    #[test]
    fn test_raw_policy() {
        let tokens = Tokenizer::Raw.tokenize("  a \"b c ", false).unwrap();
        assert_eq!(values(&tokens), vec!["  a \"b c "]);
        assert_eq!(tokens[0].span(), 0..9);

        let tokens = Tokenizer::Raw.tokenize("a ", true).unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(Tokenizer::Raw.tokenize("", false).unwrap().is_empty());
    }

    #[test]
    fn test_space_split_policy() {
        let tokens = Tokenizer::SpaceSplit.tokenize("a \"b  c\" \\d", false).unwrap();
        assert_eq!(values(&tokens), vec!["a", "\"b", "c\"", "\\d"]);
        assert_eq!(tokens[2].span(), 6..8);
    }

    #[test]
    fn test_multibyte_spans() {
        let tokens = Tokenizer::LenientQuoted.tokenize("héllo wörld", false).unwrap();
        assert_eq!(values(&tokens), vec!["héllo", "wörld"]);
        assert_eq!(tokens[1].start(), "héllo ".len());
        assert_eq!(tokens[1].end(), "héllo wörld".len());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("strict".parse::<Tokenizer>().unwrap(), Tokenizer::StrictQuoted);
        assert_eq!("SPACE-SPLIT".parse::<Tokenizer>().unwrap(), Tokenizer::SpaceSplit);
        assert!("bogus".parse::<Tokenizer>().is_err());
        assert_eq!(Tokenizer::Raw.to_string(), "raw");
    }

    #[test]
    fn test_quote_reads_back_as_one_token() {
        let policy = Tokenizer::StrictQuoted;
        assert_eq!(policy.quote("plain"), "plain");
        for value in ["two words", "it's", "say \"hi\"", "back\\slash", ""] {
            let quoted = policy.quote(value);
            let tokens = policy.tokenize(&quoted, false).unwrap();
            assert_eq!(values(&tokens), vec![value], "{quoted}");
        }
        assert_eq!(Tokenizer::SpaceSplit.quote("a b"), "a b");
    }
}
