//! Output formatting for parse results
//!
//! This module renders what the binary prints:
//! - Parse contexts and token lists as JSON (compact or pretty-printed)
//! - Argument errors as caret diagnostics, optionally colored
//! - Completion candidates, one per line

use nu_ansi_term::{Color, Style};

use crate::config::{DisplayConfig, OutputFormat};
use crate::error::{ArgumentError, Result};
use crate::parser::{ArgumentToken, ParseContext};

/// Formatter for parse results and diagnostics
#[derive(Debug, Clone)]
pub struct Formatter {
    /// Output format type
    format_type: OutputFormat,

    /// Print the input with a caret under the failing token
    show_caret: bool,

    /// Enable colored output
    use_colors: bool,
}

impl Formatter {
    /// Create a new formatter
    ///
    /// # Arguments
    /// * `format_type` - Output format type
    /// * `use_colors` - Enable colored output
    ///
    /// # Returns
    /// * `Self` - New formatter instance
    pub fn new(format_type: OutputFormat, use_colors: bool) -> Self {
        Self {
            format_type,
            show_caret: true,
            use_colors,
        }
    }

    /// Create a formatter from display configuration
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            format_type: config.format,
            show_caret: config.show_caret,
            use_colors: config.color_output,
        }
    }

    /// Format a parse context as a JSON object of key to value list
    pub fn format_context(&self, context: &ParseContext) -> Result<String> {
        self.to_json(context)
    }

    /// Format tokens with their byte spans
    pub fn format_tokens(&self, tokens: &[ArgumentToken]) -> Result<String> {
        self.to_json(&tokens)
    }

    /// Format completion candidates, one per line
    pub fn format_candidates(&self, candidates: &[String]) -> String {
        candidates.join("\n")
    }

    /// Format an argument error as a diagnostic
    ///
    /// # Returns
    /// * `String` - The message, followed by the input and a caret line when
    ///   carets are enabled
    pub fn format_error(&self, err: &ArgumentError) -> String {
        let text = if self.show_caret {
            err.annotated()
        } else {
            err.message().to_string()
        };

        if !self.use_colors {
            return text;
        }

        let mut lines = text.lines();
        let mut out = Color::Red.bold().paint(lines.next().unwrap_or_default()).to_string();
        for line in lines {
            out.push('\n');
            if line.trim_start() == "^" {
                out.push_str(&Color::Yellow.paint(line).to_string());
            } else {
                out.push_str(line);
            }
        }
        out
    }

    /// Style a short informational line (banner, hints)
    pub fn format_info(&self, text: &str) -> String {
        if self.use_colors {
            Style::new().fg(Color::DarkGray).paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn to_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.format_type.is_pretty() {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_format_context_compact() {
        let mut context = ParseContext::new();
        context.put("key", "greeting");
        context.put("ttl", 30);
        let formatter = Formatter::new(OutputFormat::Json, false);
        assert_eq!(
            formatter.format_context(&context).unwrap(),
            r#"{"key":["greeting"],"ttl":[30]}"#
        );
    }

    #[test]
    fn test_format_tokens() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let tokens = vec![ArgumentToken::new("a b", 0, 5)];
        assert_eq!(
            formatter.format_tokens(&tokens).unwrap(),
            r#"[{"value":"a b","start":0,"end":5}]"#
        );
    }

    #[test]
    fn test_format_error_plain() {
        let err = ArgumentError::new(ErrorKind::TypeConversion, "bad", "x yz", 2);
        let formatter = Formatter::new(OutputFormat::Json, false);
        assert_eq!(formatter.format_error(&err), "bad\nx yz\n  ^");
    }

    #[test]
    fn test_format_error_without_caret() {
        let err = ArgumentError::new(ErrorKind::TypeConversion, "bad", "x yz", 2);
        let config = DisplayConfig {
            show_caret: false,
            color_output: false,
            ..DisplayConfig::default()
        };
        assert_eq!(Formatter::from_config(&config).format_error(&err), "bad");
    }

    #[test]
    fn test_format_error_colored() {
        let err = ArgumentError::new(ErrorKind::TypeConversion, "bad", "x yz", 2);
        let formatter = Formatter::new(OutputFormat::Json, true);
        let out = formatter.format_error(&err);
        assert!(out.contains("\x1b["));
        assert!(out.contains("x yz"));
    }
}
