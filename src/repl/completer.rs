//! Completer for reedline - provides completion suggestions

use reedline::{Completer, Span, Suggestion};

use crate::parser::ArgumentParser;

/// Argument completer for reedline
pub struct ArgumentCompleter {
    parser: ArgumentParser,
}

impl ArgumentCompleter {
    /// Create a completer over `parser`'s grammar
    pub fn new(parser: ArgumentParser) -> Self {
        Self { parser }
    }
}

impl Completer for ArgumentCompleter {
    /// Complete the input at the given cursor position
    ///
    /// # Arguments
    /// * `line` - The input line
    /// * `pos` - Cursor position (byte index)
    ///
    /// # Returns
    /// * `Vec<Suggestion>` - Suggestions replacing the token under the cursor
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let (start, candidates) = self.parser.complete_line(line, pos);
        let end = pos.min(line.len()).max(start);

        candidates
            .into_iter()
            .map(|value| Suggestion {
                value,
                span: Span::new(start, end),
                append_whitespace: true,
                ..Suggestion::default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::grammar::demo_parser;
    use crate::config::ParserConfig;

    fn create_test_completer() -> ArgumentCompleter {
        ArgumentCompleter::new(demo_parser(&ParserConfig::default()))
    }

    #[test]
    fn test_complete_command_word() {
        let mut completer = create_test_completer();
        let suggestions = completer.complete("li", 2);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value, "list");
        assert_eq!(suggestions[0].span.start, 0);
        assert_eq!(suggestions[0].span.end, 2);
    }

    #[test]
    fn test_complete_next_argument() {
        let mut completer = create_test_completer();
        let suggestions = completer.complete("list 5 ", 7);
        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["asc", "desc"]);
        for suggestion in suggestions {
            assert_eq!(suggestion.span.start, 7);
            assert_eq!(suggestion.span.end, 7);
        }
    }

    #[test]
    fn test_complete_long_flag_span() {
        let mut completer = create_test_completer();
        let suggestions = completer.complete("set --tt", 8);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value, "--ttl");
        assert_eq!(suggestions[0].span.start, 4);
    }

    #[test]
    fn test_cursor_in_middle_of_line() {
        let mut completer = create_test_completer();
        let suggestions = completer.complete("ge key", 2);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value, "get");
        assert_eq!(suggestions[0].span.end, 2);
    }
}
