//! cmdargs - command argument parser and completion engine
//!
//! Parses, tokenizes and completes command lines against a built-in demo
//! grammar, one-shot from the command line or in an interactive REPL.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! cmdargs
//!
//! # One-shot
//! cmdargs parse "set --ttl 30 greeting hello"
//! cmdargs complete "set --t"
//! cmdargs --tokenizer strict tokens "a \"b c\""
//! ```

use std::process::ExitCode;

use cmdargs::cli::CliInterface;
use cmdargs::error::Result;
use cmdargs::repl::ReplEngine;

/// Application entry point
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
///
/// Parses arguments, loads configuration, initializes logging, then runs a
/// one-shot subcommand or the REPL.
fn run() -> Result<ExitCode> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if let Some(code) = cli.handle_subcommand()? {
        return Ok(code);
    }

    cli.print_banner();

    let mut repl = ReplEngine::new(cli.parser(), cli.config())?;
    repl.run()?;

    if !cli.args().quiet {
        println!("Goodbye!");
    }
    Ok(ExitCode::SUCCESS)
}

/// Initialize logging system from the effective configuration
///
/// `-v`/`--vv`/`-q` have already been folded into `config.logging.level`.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
