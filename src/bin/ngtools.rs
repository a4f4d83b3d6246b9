//! ngtools command line
//!
//! # Usage
//!
//! ```bash
//! # Interactive shell
//! ngtools
//!
//! # Run commands and exit
//! ngtools -c "load zarr://host/brain.zarr" -c "display RAS" -c "state --url"
//!
//! # Source descriptions from a JSON catalog
//! NGTOOLS_DESCRIPTIONS=catalog.json ngtools
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use ngtools::config::{
    Config, DEFAULT_DISPLAY, ENV_BASE_URL, ENV_DESCRIPTIONS, ENV_DISPLAY, ENV_HISTORY, ENV_LOG,
};
use ngtools::repl::{report, Outcome, Repl};
use ngtools::types::DEFAULT_BASE_URL;

#[derive(Parser)]
#[command(name = "ngtools")]
#[command(version)]
#[command(about = "Command controller for a volumetric image viewer")]
struct Cli {
    /// Viewer URL used for `state --url`
    #[arg(long, env = ENV_BASE_URL, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Shell history file
    #[arg(long, env = ENV_HISTORY)]
    history: Option<PathBuf>,

    /// Do not read or write shell history
    #[arg(long)]
    no_history: bool,

    /// JSON catalog of source descriptions
    #[arg(long, env = ENV_DESCRIPTIONS)]
    descriptions: Option<PathBuf>,

    /// Initial display axes
    #[arg(long, env = ENV_DISPLAY, default_value = DEFAULT_DISPLAY)]
    display: String,

    /// Log filter, e.g. `ng_space=debug`
    #[arg(long, env = ENV_LOG)]
    log: Option<String>,

    /// Run a command and exit (repeatable)
    #[arg(long, short = 'c')]
    command: Vec<String>,
}

impl Cli {
    fn config(&self) -> Config {
        let history = if self.no_history {
            None
        } else {
            self.history
                .clone()
                .or_else(ngtools::config::default_history)
        };
        Config {
            base_url: self.base_url.clone(),
            history,
            descriptions: self.descriptions.clone(),
            display: self.display.clone(),
            log: self.log.clone(),
        }
    }
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = cli.config();
    ngtools::logging::init(config.log.as_deref());

    let session = match config.session() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };
    let mut repl = Repl::new(session).with_history(config.history.clone());

    if !cli.command.is_empty() {
        return run_commands(&mut repl, &cli.command);
    }

    match repl.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Stop at the first failing command.
fn run_commands<S: ngtools::StateStore>(repl: &mut Repl<S>, commands: &[String]) -> ExitCode {
    for line in commands {
        match repl.execute_line(line) {
            Ok(Outcome::Exit) => break,
            Ok(Outcome::Continue(Some(output))) => println!("{output}"),
            Ok(Outcome::Continue(None)) => {}
            Err(e) => {
                report(&e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
