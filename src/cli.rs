// src/cli.rs
use clap::Parser;
use std::path::PathBuf;

use crate::catalog::{Draft, Network, PackageManager, TemplateId};

#[derive(Parser, Debug)]
#[command(
    name = "create-move-dapp", // Command name users type
    author,
    version,
    about = "Scaffolds Move dapp starter projects from bundled templates.",
    long_about = None
)]
pub struct Cli {
  /// Project name (skips the project-name prompt)
  #[arg(long)]
  pub name: Option<String>,

  /// Template identifier (skips the template prompt)
  #[arg(long, value_enum)]
  pub template: Option<TemplateId>,

  /// Target network (skips the network prompt)
  #[arg(long, value_enum)]
  pub network: Option<Network>,

  /// Package manager for dependency installation (skips the prompt)
  #[arg(long, value_enum)]
  pub package_manager: Option<PackageManager>,

  /// Increase verbosity level (e.g., -v, -vv)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  #[arg(long)] // Configures the --templates-dir command-line flag
  #[clap(env = "CREATE_MOVE_DAPP_TEMPLATES_DIR")] // Environment variable fallback
  pub templates_dir: Option<PathBuf>,
}

impl Cli {
  /// Seeds the answer accumulator with options supplied on the command
  /// line, so the collector skips those prompts.
  pub fn seed_draft(&self) -> Draft {
    Draft {
      project_name: self.name.clone(),
      template: self.template,
      network: self.network,
      package_manager: self.package_manager,
      ..Draft::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pre_supplied_options_seed_the_draft() {
    let cli = Cli::parse_from([
      "create-move-dapp",
      "--name",
      "demo",
      "--template",
      "boilerplate",
      "--network",
      "testnet",
      "--package-manager",
      "pnpm",
    ]);
    let draft = cli.seed_draft();
    assert_eq!(draft.project_name.as_deref(), Some("demo"));
    assert_eq!(draft.template, Some(TemplateId::Boilerplate));
    assert_eq!(draft.network, Some(Network::Testnet));
    assert_eq!(draft.package_manager, Some(PackageManager::Pnpm));
    assert_eq!(draft.project_type, None); // derived later from the template
  }

  #[test]
  fn bare_invocation_seeds_an_empty_draft() {
    let cli = Cli::parse_from(["create-move-dapp"]);
    let draft = cli.seed_draft();
    assert!(draft.project_name.is_none());
    assert!(draft.template.is_none());
  }
}
