//! REPL (Read-Eval-Print Loop) for cmdargs
//!
//! This module provides an interactive shell over the demo grammar:
//! - Line editing with reedline
//! - Tab completion through a columnar menu backed by the argument parser
//! - Token-based highlighting
//! - File-backed command history
//!
//! Each line is parsed on its own; the recorded values are printed as JSON,
//! failures as a caret diagnostic.

mod completer;
mod highlighter;
mod prompt;

pub use completer::ArgumentCompleter;
pub use highlighter::ArgsHighlighter;
pub use prompt::ArgsPrompt;

use std::fs;

use reedline::{
    ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use tracing::{debug, warn};

use crate::cli::grammar::USAGE;
use crate::config::{Config, HistoryConfig};
use crate::error::Result;
use crate::formatter::Formatter;
use crate::parser::ArgumentParser;

const COMPLETION_MENU: &str = "completion_menu";

/// Result of evaluating one REPL line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Blank line, nothing to print
    Empty,

    /// Leave the loop
    Exit,

    /// Text for stdout
    Output(String),

    /// Diagnostic for stderr
    Error(String),
}

/// Evaluates REPL lines against a parser
#[derive(Debug, Clone)]
pub struct Evaluator {
    parser: ArgumentParser,
    formatter: Formatter,
}

impl Evaluator {
    pub fn new(parser: ArgumentParser, formatter: Formatter) -> Self {
        Self { parser, formatter }
    }

    /// Evaluate one input line
    ///
    /// `exit`, `quit` and `help` are handled before the grammar sees the line.
    pub fn evaluate(&self, line: &str) -> Evaluation {
        match line.trim() {
            "" => Evaluation::Empty,
            "exit" | "quit" => Evaluation::Exit,
            "help" => Evaluation::Output(USAGE.to_string()),
            _ => match self.parser.parse(line) {
                Ok(context) => match self.formatter.format_context(&context) {
                    Ok(json) => Evaluation::Output(json),
                    Err(e) => Evaluation::Error(e.to_string()),
                },
                Err(err) => {
                    debug!(kind = %err.kind(), position = err.position(), "line rejected");
                    Evaluation::Error(self.formatter.format_error(&err))
                }
            },
        }
    }
}

/// REPL engine for interactive parsing
pub struct ReplEngine {
    /// Line editor for command input
    editor: Reedline,

    prompt: ArgsPrompt,

    evaluator: Evaluator,

    /// Whether to continue running
    running: bool,
}

impl ReplEngine {
    /// Create a new REPL engine
    ///
    /// # Arguments
    /// * `parser` - Parser for each input line
    /// * `config` - Effective configuration (display and history sections)
    ///
    /// # Returns
    /// * `Result<Self>` - New REPL engine or error
    pub fn new(parser: ArgumentParser, config: &Config) -> Result<Self> {
        let tokenizer = parser.tokenizer();
        let formatter = Formatter::from_config(&config.display);

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let completion_menu = Box::new(ColumnarMenu::default().with_name(COMPLETION_MENU));

        let mut editor = Reedline::create()
            .with_completer(Box::new(ArgumentCompleter::new(parser.clone())))
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(Box::new(Emacs::new(keybindings)))
            .with_highlighter(Box::new(ArgsHighlighter::new(
                tokenizer,
                config.display.color_output,
            )));

        if let Some(history) = Self::open_history(&config.history) {
            editor = editor.with_history(history);
        }

        Ok(Self {
            editor,
            prompt: ArgsPrompt::new(tokenizer),
            evaluator: Evaluator::new(parser, formatter),
            running: true,
        })
    }

    /// Open the history file; in-memory history is used when this fails
    fn open_history(config: &HistoryConfig) -> Option<Box<FileBackedHistory>> {
        if !config.persist {
            return None;
        }
        if let Some(parent) = config.file_path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!(path = %parent.display(), error = %e, "cannot create history directory");
            return None;
        }
        match FileBackedHistory::with_file(config.max_size, config.file_path.clone()) {
            Ok(history) => Some(Box::new(history)),
            Err(e) => {
                warn!(path = %config.file_path.display(), error = %e, "cannot open history file");
                None
            }
        }
    }

    /// Read a single line of input
    ///
    /// # Returns
    /// * `Result<Option<String>>` - Input line, an empty line on Ctrl-C, or
    ///   None on Ctrl-D
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.read_line(&self.prompt)? {
            Signal::Success(line) => Ok(Some(line)),
            Signal::CtrlC => Ok(Some(String::new())),
            _ => Ok(None),
        }
    }

    /// Check if REPL is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run the loop until `exit` or Ctrl-D
    pub fn run(&mut self) -> Result<()> {
        while self.is_running() {
            let Some(line) = self.read_line()? else {
                break;
            };

            match self.evaluator.evaluate(&line) {
                Evaluation::Empty => {}
                Evaluation::Exit => self.running = false,
                Evaluation::Output(text) => println!("{text}"),
                Evaluation::Error(text) => eprintln!("{text}"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::grammar::demo_parser;
    use crate::config::{OutputFormat, ParserConfig};

    fn evaluator() -> Evaluator {
        Evaluator::new(
            demo_parser(&ParserConfig::default()),
            Formatter::new(OutputFormat::Json, false),
        )
    }

    #[test]
    fn test_builtin_words() {
        let evaluator = evaluator();
        assert_eq!(evaluator.evaluate("   "), Evaluation::Empty);
        assert_eq!(evaluator.evaluate(" quit "), Evaluation::Exit);
        assert_eq!(evaluator.evaluate("help"), Evaluation::Output(USAGE.to_string()));
    }

    #[test]
    fn test_parsed_line_prints_json() {
        assert_eq!(
            evaluator().evaluate("list 3"),
            Evaluation::Output(r#"{"list":[true],"limit":[3]}"#.to_string())
        );
    }

    #[test]
    fn test_rejected_line_prints_diagnostic() {
        match evaluator().evaluate("get") {
            Evaluation::Error(text) => {
                assert!(text.starts_with("Argument get did not match expected next argument del"))
            }
            other => panic!("expected an error, got {other:?}"),
        }
    }

    #[test]
    fn test_history_disabled() {
        let config = HistoryConfig {
            persist: false,
            ..HistoryConfig::default()
        };
        assert!(ReplEngine::open_history(&config).is_none());
    }

    #[test]
    fn test_history_file_created_in_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = HistoryConfig {
            max_size: 10,
            file_path: dir.path().join("nested").join("history"),
            persist: true,
        };
        assert!(ReplEngine::open_history(&config).is_some());
        assert!(dir.path().join("nested").is_dir());
    }
}
