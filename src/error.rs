// src/error.rs
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
  /// The user backed out of a prompt. Clean exit, not a failure.
  #[error("Scaffolding cancelled by user")]
  Cancelled,

  #[error("IO Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Invalid project name '{name}': {reason}")]
  InvalidProjectName { name: String, reason: String },

  #[error(
    "Directory '{0}' already exists and was not overwritten. Choose a different project name."
  )]
  DestinationExists(PathBuf),

  #[error("Destination path '{0}' exists but is not a directory")]
  DestinationNotADirectory(PathBuf),

  #[error("Template directory not found at path: {0}")]
  TemplateDirNotFound(PathBuf),

  #[error("Selection is missing a value for '{0}'")]
  IncompleteSelection(&'static str),

  #[error("Template '{template}' does not support the {network} network")]
  UnsupportedCombination { template: String, network: String },

  #[error("Template '{template}' does not fit a {project_type} project")]
  TemplateTypeMismatch {
    template: String,
    project_type: String,
  },

  #[error("No environment-variable convention for template '{template}' without a frontend framework")]
  MissingFramework { template: String },

  #[error("Could not read project manifest '{manifest_path}': {source}")]
  ManifestRead {
    manifest_path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Could not parse project manifest '{manifest_path}': {source}")]
  ManifestParse {
    manifest_path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to create output directory '{path}': {source}")]
  OutputDirCreation {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Error walking template directory '{path}': {source}")]
  WalkDir {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("Step '{step}' failed: {source}")]
  StepFailed {
    step: &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("Dependency installation with {package_manager} failed ({status})")]
  InstallFailed {
    package_manager: String,
    status: ExitStatus,
  },

  #[error("User interaction failed: {0}")]
  Prompt(dialoguer::Error),

  #[error("Could not determine templates directory")]
  CannotDetermineTemplatesDir,
}

// A Ctrl-C inside a prompt surfaces as an interrupted IO error; that is the
// user-abort path, not an interaction failure.
impl From<dialoguer::Error> for ScaffoldError {
  fn from(err: dialoguer::Error) -> Self {
    match err {
      dialoguer::Error::IO(io_err) if io_err.kind() == ErrorKind::Interrupted => {
        ScaffoldError::Cancelled
      }
      other => ScaffoldError::Prompt(other),
    }
  }
}

/// Per-run state the failure reporter needs. Passed explicitly so test runs
/// never share process-wide mutable state.
#[derive(Debug)]
pub struct RunContext {
  /// Destination directory, once the scaffolder has resolved it.
  pub destination: Option<PathBuf>,
  pub verbose: bool,
}

impl RunContext {
  pub fn new(verbose: bool) -> Self {
    Self {
      destination: None,
      verbose,
    }
  }
}

/// Prints a human-readable failure report. The caller decides the exit code.
pub fn report_failure(ctx: &RunContext, err: &ScaffoldError) {
  eprintln!("Error: {}", err);

  if ctx.verbose {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
      eprintln!("  caused by: {}", cause);
      source = cause.source();
    }
  }

  // No rollback: a partially written project stays on disk.
  if let Some(dir) = &ctx.destination {
    if dir.exists() {
      eprintln!(
        "Partial output was left in '{}'. Remove it before retrying.",
        dir.display()
      );
    }
  }
}
