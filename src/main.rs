// src/main.rs
mod account;
mod catalog;
mod cli;
mod env_file;
mod error;
mod prompt;
mod scaffold;
mod shell;

use clap::Parser;
use cli::Cli;
use error::{report_failure, RunContext, ScaffoldError};
use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
  let cli = Cli::parse();

  // Setup logging based on verbosity
  let log_level = match cli.verbose {
    0 => LevelFilter::Info,
    1 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };
  env_logger::Builder::new().filter_level(log_level).init();

  log::debug!("CLI args: {:?}", cli);

  // The only place that maps errors to process exit codes.
  let mut ctx = RunContext::new(cli.verbose > 0);
  match run(cli, &mut ctx) {
    Ok(()) => {}
    Err(ScaffoldError::Cancelled) => {
      // User abort: clean exit, code 0.
      println!("Scaffolding cancelled.");
    }
    Err(err) => {
      report_failure(&ctx, &err);
      process::exit(1);
    }
  }
}

fn run(cli: Cli, ctx: &mut RunContext) -> Result<(), ScaffoldError> {
  let templates_path = determine_templates_dir(cli.templates_dir.clone())?;
  log::info!("Using templates directory: {}", templates_path.display());

  let selection = prompt::collect(cli.seed_draft())?;
  log::debug!("Resolved selection: {:?}", selection);

  scaffold::run_scaffold(&selection, &templates_path, ctx)
}

/// Determines the templates directory path.
/// Order of preference:
/// 1. --templates-dir CLI argument
/// 2. CREATE_MOVE_DAPP_TEMPLATES_DIR environment variable
/// 3. templates/ subdirectory relative to the executable
/// 4. templates/ subdirectory relative to the current working directory (fallback)
fn determine_templates_dir(cli_path: Option<PathBuf>) -> Result<PathBuf, ScaffoldError> {
  if let Some(path) = cli_path {
    if path.is_dir() {
      return Ok(path);
    } else {
      log::warn!(
        "Provided --templates-dir path does not exist or is not a directory: {}",
        path.display()
      );
    }
  }

  // Env variable check happens automatically via clap's `env` attribute

  // Relative to executable
  if let Ok(mut exe_path) = env::current_exe() {
    exe_path.pop(); // Remove the executable name
    let path = exe_path.join("templates");
    if path.is_dir() {
      return Ok(path);
    }
  }

  // Relative to current working directory as a last resort
  let path = PathBuf::from("templates");
  if path.is_dir() {
    return Ok(path);
  }

  Err(ScaffoldError::CannotDetermineTemplatesDir)
}
