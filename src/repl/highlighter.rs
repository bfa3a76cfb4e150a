//! Token-based highlighter for the REPL input line
//!
//! The line is split with the active tokenizer; flags, quoted arguments and
//! the leading command word each get their own style. Text between tokens is
//! left unstyled.

use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

use crate::parser::Tokenizer;

/// Highlighter driven by the argument tokenizer
pub struct ArgsHighlighter {
    tokenizer: Tokenizer,
    enabled: bool,
}

impl ArgsHighlighter {
    pub fn new(tokenizer: Tokenizer, enabled: bool) -> Self {
        Self { tokenizer, enabled }
    }

    fn style_for(index: usize, raw: &str) -> Style {
        if raw.starts_with('"') || raw.starts_with('\'') {
            Style::new().fg(Color::Green)
        } else if raw.starts_with('-') && raw != "-" && raw != "--" {
            Style::new().fg(Color::Cyan)
        } else if index == 0 {
            Style::new().bold()
        } else {
            Style::default()
        }
    }
}

impl Highlighter for ArgsHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();

        // Strict quoting rejects open quotes while typing; highlight leniently
        let tokens = match self.tokenizer {
            Tokenizer::StrictQuoted => Tokenizer::LenientQuoted.tokenize(line, false),
            other => other.tokenize(line, false),
        };
        let tokens = match tokens {
            Ok(tokens) if self.enabled => tokens,
            _ => {
                styled.push((Style::default(), line.to_string()));
                return styled;
            }
        };

        let mut last = 0;
        for (index, token) in tokens.iter().enumerate() {
            if token.start() > last {
                styled.push((Style::default(), line[last..token.start()].to_string()));
            }
            let raw = &line[token.span()];
            styled.push((Self::style_for(index, raw), raw.to_string()));
            last = token.end();
        }
        if last < line.len() {
            styled.push((Style::default(), line[last..].to_string()));
        }
        styled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(styled: &StyledText) -> String {
        styled.buffer.iter().map(|(_, text)| text.as_str()).collect()
    }

    #[test]
    fn test_highlight_preserves_text() {
        let highlighter = ArgsHighlighter::new(Tokenizer::LenientQuoted, true);
        let line = "set  -f \"a b\" --ttl=3 ";
        assert_eq!(plain(&highlighter.highlight(line, 0)), line);
    }

    #[test]
    fn test_highlight_styles() {
        let highlighter = ArgsHighlighter::new(Tokenizer::LenientQuoted, true);
        let styled = highlighter.highlight("set -f \"v\"", 0);
        let segments: Vec<(Style, &str)> = styled
            .buffer
            .iter()
            .map(|(style, text)| (*style, text.as_str()))
            .collect();
        assert_eq!(segments[0], (Style::new().bold(), "set"));
        assert_eq!(segments[2], (Style::new().fg(Color::Cyan), "-f"));
        assert_eq!(segments[4], (Style::new().fg(Color::Green), "\"v\""));
    }

    #[test]
    fn test_disabled_highlighter_is_plain() {
        let highlighter = ArgsHighlighter::new(Tokenizer::LenientQuoted, false);
        let styled = highlighter.highlight("set -f", 0);
        assert_eq!(styled.buffer.len(), 1);
        assert_eq!(styled.buffer[0].0, Style::default());
    }

    #[test]
    fn test_strict_open_quote_is_tolerated() {
        let highlighter = ArgsHighlighter::new(Tokenizer::StrictQuoted, true);
        assert_eq!(plain(&highlighter.highlight("get \"open", 0)), "get \"open");
    }
}
