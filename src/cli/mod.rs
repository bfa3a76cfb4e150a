//! Command-line interface for cmdargs
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and CLI overrides
//! - One-shot subcommands (parse, complete, tokens, config)
//! - Mode selection (one-shot vs interactive REPL)

pub mod grammar;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{Config, LogLevel, OutputFormat};
use crate::error::Result;
use crate::formatter::Formatter;
use crate::parser::{ArgumentParser, Tokenizer};

/// cmdargs - command argument parser and completion engine
#[derive(Parser, Debug)]
#[command(
    name = "cmdargs",
    version,
    about = "Parse and complete command arguments against a combinator grammar",
    long_about = "Tokenize, parse and complete command lines against a built-in demo grammar.
Runs an interactive REPL with tab completion when no subcommand is given."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Tokenizer policy (lenient-quoted, strict-quoted, raw, space-split)
    #[arg(long, value_name = "POLICY")]
    pub tokenizer: Option<Tokenizer>,

    /// Output format (json, json-pretty)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Quiet mode (only errors are logged)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Parse INPUT and print the recorded values as JSON
    Parse {
        /// Command line to parse, quoted as one shell argument
        #[arg(value_name = "INPUT", allow_hyphen_values = true)]
        input: String,
    },

    /// Print completion candidates for the final token of INPUT
    Complete {
        /// Partial command line; a trailing space completes the next argument
        #[arg(value_name = "INPUT", allow_hyphen_values = true)]
        input: String,
    },

    /// Print the tokens of INPUT with their byte spans
    Tokens {
        #[arg(value_name = "INPUT", allow_hyphen_values = true)]
        input: String,

        /// Tokenize as for completion (tolerate open quotes, add trailing token)
        #[arg(long)]
        for_completion: bool,
    },

    /// Start the interactive REPL (default)
    Repl,

    /// Show, validate or write configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,

        /// Write the effective configuration to the configuration file
        #[arg(long)]
        write: bool,
    },
}

/// Text produced by a one-shot subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Text to print
    pub text: String,

    /// Whether the command succeeded; failures go to stderr
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }

    fn failed(text: String) -> Self {
        Self {
            text,
            success: false,
        }
    }
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = match Config::load_from_file(args.config_file.as_deref()) {
            Ok(config) => config,
            Err(e) if args.config_file.is_none() => {
                eprintln!("Warning: {e}, using default configuration");
                Config::default()
            }
            Err(e) => return Err(e),
        };

        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_parser_args(config, args);
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);
    }

    /// Apply parser-related CLI arguments to configuration
    fn apply_parser_args(config: &mut Config, args: &CliArgs) {
        if let Some(tokenizer) = args.tokenizer {
            config.parser.tokenizer = tokenizer;
        }
    }

    /// Apply display-related CLI arguments to configuration
    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if let Some(format_str) = &args.format {
            config.display.format = Self::parse_output_format(format_str, config.display.format);
        }

        if args.no_color {
            config.display.color_output = false;
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Parse output format string, keeping `current` for unknown names
    fn parse_output_format(format_str: &str, current: OutputFormat) -> OutputFormat {
        match format_str.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "json-pretty" | "jsonpretty" | "pretty" => OutputFormat::JsonPretty,
            _ => {
                eprintln!("Warning: Unknown format '{format_str}', using default");
                current
            }
        }
    }

    /// Parser for the demo grammar under the effective configuration
    pub fn parser(&self) -> ArgumentParser {
        grammar::demo_parser(&self.config.parser)
    }

    /// Formatter for the effective display configuration
    pub fn formatter(&self) -> Formatter {
        Formatter::from_config(&self.config.display)
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<Option<ExitCode>>` - Exit code if a one-shot subcommand ran,
    ///   `None` to continue into the REPL
    pub fn handle_subcommand(&self) -> Result<Option<ExitCode>> {
        let output = match &self.args.command {
            Some(Commands::Parse { input }) => self.parse_command(input)?,
            Some(Commands::Complete { input }) => self.complete_command(input),
            Some(Commands::Tokens {
                input,
                for_completion,
            }) => self.tokens_command(input, *for_completion)?,
            Some(Commands::Config {
                show,
                validate,
                write,
            }) => self.config_command(*show, *validate, *write)?,
            Some(Commands::Repl) | None => return Ok(None),
        };

        if output.success {
            if !output.text.is_empty() {
                println!("{}", output.text);
            }
            Ok(Some(ExitCode::SUCCESS))
        } else {
            eprintln!("{}", output.text);
            Ok(Some(ExitCode::FAILURE))
        }
    }

    /// Parse `input` and render the context, or the diagnostic on failure
    pub fn parse_command(&self, input: &str) -> Result<CommandOutput> {
        let formatter = self.formatter();
        match self.parser().parse(input) {
            Ok(context) => Ok(CommandOutput::ok(formatter.format_context(&context)?)),
            Err(err) => Ok(CommandOutput::failed(formatter.format_error(&err))),
        }
    }

    /// Complete the final token of `input`
    pub fn complete_command(&self, input: &str) -> CommandOutput {
        let candidates = self.parser().complete(input);
        CommandOutput::ok(self.formatter().format_candidates(&candidates))
    }

    /// Tokenize `input` with the configured policy
    pub fn tokens_command(&self, input: &str, for_completion: bool) -> Result<CommandOutput> {
        let formatter = self.formatter();
        match self.config.parser.tokenizer.tokenize(input, for_completion) {
            Ok(tokens) => Ok(CommandOutput::ok(formatter.format_tokens(&tokens)?)),
            Err(err) => Ok(CommandOutput::failed(formatter.format_error(&err))),
        }
    }

    /// Handle config subcommand
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    /// * `write` - Whether to save the effective configuration, so options
    ///   given on the command line become the new defaults
    pub fn config_command(
        &self,
        show: bool,
        validate: bool,
        write: bool,
    ) -> Result<CommandOutput> {
        let mut lines = Vec::new();
        let mut success = true;

        if validate {
            let path = self.config_path();
            lines.push(format!("Validating configuration file: {}", path.display()));
            match Config::load_from_file(Some(path.as_path())) {
                Ok(_) => lines.push("Configuration is valid".to_string()),
                Err(e) => {
                    lines.push(format!("Configuration is invalid: {e}"));
                    success = false;
                }
            }
        }

        if write {
            let path = self.config_path();
            self.config.save(&path)?;
            lines.push(format!("Configuration written to {}", path.display()));
        }

        if show || !(validate || write) {
            lines.push(toml::to_string_pretty(&self.config)?);
        }

        Ok(CommandOutput {
            text: lines.join("\n"),
            success,
        })
    }

    /// Get configuration file path (from args or default)
    pub fn config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    /// Print banner unless in quiet mode
    pub fn print_banner(&self) {
        if !self.args.quiet {
            let formatter = self.formatter();
            println!("cmdargs {}", env!("CARGO_PKG_VERSION"));
            println!(
                "{}",
                formatter.format_info("Type 'help' for the grammar, Tab to complete, Ctrl-D to exit.")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::elements::UnknownFlagPolicy;

    fn cli(argv: &[&str]) -> CliInterface {
        let args = CliArgs::try_parse_from(argv).unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        CliInterface { args, config }
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(["cmdargs"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.tokenizer.is_none());
        assert!(args.config_file.is_none());
    }

    #[test]
    fn test_cli_args_with_flags() {
        let args = CliArgs::try_parse_from(["cmdargs", "--no-color", "--quiet"]).unwrap();
        assert!(args.no_color);
        assert!(args.quiet);
    }

    #[test]
    fn test_subcommand_input_with_dashes() {
        let args = CliArgs::try_parse_from(["cmdargs", "parse", "--ttl 5 k v"]).unwrap();
        assert_eq!(
            args.command,
            Some(Commands::Parse {
                input: "--ttl 5 k v".to_string()
            })
        );
    }

    #[test]
    fn test_tokenizer_argument() {
        let cli = cli(&["cmdargs", "--tokenizer", "strict", "tokens", "a"]);
        assert_eq!(cli.config().parser.tokenizer, Tokenizer::StrictQuoted);
        assert!(CliArgs::try_parse_from(["cmdargs", "--tokenizer", "sideways"]).is_err());
    }

    #[test]
    fn test_logging_overrides() {
        assert_eq!(cli(&["cmdargs", "--vv"]).config().logging.level, LogLevel::Trace);
        assert_eq!(cli(&["cmdargs", "-v"]).config().logging.level, LogLevel::Debug);
        assert_eq!(cli(&["cmdargs", "-q"]).config().logging.level, LogLevel::Error);
        assert_eq!(cli(&["cmdargs"]).config().logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_display_overrides() {
        let cli = cli(&["cmdargs", "--format", "json", "--no-color"]);
        assert_eq!(cli.config().display.format, OutputFormat::Json);
        assert!(!cli.config().display.color_output);
    }

    #[test]
    fn test_parse_command_output() {
        let cli = cli(&["cmdargs", "--format", "json", "--no-color"]);
        let output = cli.parse_command("get greeting").unwrap();
        assert!(output.success);
        assert_eq!(output.text, r#"{"get":[true],"key":["greeting"]}"#);
    }

    #[test]
    fn test_parse_command_failure_renders_caret() {
        let cli = cli(&["cmdargs", "--no-color"]);
        let output = cli.parse_command("list x y").unwrap();
        assert!(!output.success);
        assert!(output.text.ends_with("^"));
    }

    #[test]
    fn test_complete_command_output() {
        let cli = cli(&["cmdargs"]);
        assert_eq!(cli.complete_command("l").text, "list");
        assert_eq!(cli.complete_command("list 3 ").text, "asc\ndesc");
    }

    #[test]
    fn test_tokens_command_strict_failure() {
        let cli = cli(&["cmdargs", "--tokenizer", "strict", "--no-color"]);
        let output = cli.tokens_command("\"open", false).unwrap();
        assert!(!output.success);

        let output = cli.tokens_command("\"open", true).unwrap();
        assert!(output.success);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[parser]\nunknown_long_flags = \"ignore\"\n").unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let args = CliArgs::try_parse_from(["cmdargs", "-c", path_arg.as_str()]).unwrap();
        let cli = CliInterface::from_args(args).unwrap();
        assert_eq!(cli.config().parser.unknown_long_flags, UnknownFlagPolicy::Ignore);

        let validated = cli.config_command(false, true, false).unwrap();
        assert!(validated.success);
    }

    #[test]
    fn test_config_write_saves_effective_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\ncolor_output = false\n").unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let args = CliArgs::try_parse_from([
            "cmdargs",
            "-c",
            path_arg.as_str(),
            "--tokenizer",
            "raw",
            "config",
            "--write",
        ])
        .unwrap();
        let cli = CliInterface::from_args(args).unwrap();
        let output = cli.config_command(false, false, true).unwrap();
        assert!(output.success);
        assert!(output.text.starts_with("Configuration written to"));

        let saved = Config::load_from_file(Some(path.as_path())).unwrap();
        assert_eq!(saved.parser.tokenizer, Tokenizer::Raw);
        assert!(!saved.display.color_output);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path_arg = dir.path().join("missing.toml").to_string_lossy().to_string();
        let args = CliArgs::try_parse_from(["cmdargs", "-c", path_arg.as_str()]).unwrap();
        assert!(CliInterface::from_args(args).is_err());
    }
}
