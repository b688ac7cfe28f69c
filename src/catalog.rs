// src/catalog.rs
use std::env;
use std::fmt;

use clap::ValueEnum;

use crate::error::ScaffoldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
  /// Contract-only project (Move sources, no frontend).
  Move,
  /// Contract plus frontend.
  Fullstack,
}

impl ProjectType {
  pub fn label(self) -> &'static str {
    match self {
      ProjectType::Move => "contract-only",
      ProjectType::Fullstack => "full-stack",
    }
  }
}

impl fmt::Display for ProjectType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
  Mainnet,
  Testnet,
  Devnet,
}

impl Network {
  pub fn wire_name(self) -> &'static str {
    match self {
      Network::Mainnet => "mainnet",
      Network::Testnet => "testnet",
      Network::Devnet => "devnet",
    }
  }

  /// Faucet endpoint for networks that have one. Mainnet deliberately has
  /// none: the tool never auto-funds a real-value account.
  pub fn faucet_url(self) -> Option<&'static str> {
    match self {
      Network::Mainnet => None,
      Network::Testnet => Some("https://faucet.testnet.aptoslabs.com"),
      Network::Devnet => Some("https://faucet.devnet.aptoslabs.com"),
    }
  }
}

impl fmt::Display for Network {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.wire_name())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
  Vite,
  Nextjs,
}

impl Framework {
  pub fn label(self) -> &'static str {
    match self {
      Framework::Vite => "Vite",
      Framework::Nextjs => "Next.js",
    }
  }

  /// Each framework has exactly one client-side env-var naming convention.
  pub fn env_prefix(self) -> &'static str {
    match self {
      Framework::Vite => "VITE_",
      Framework::Nextjs => "NEXT_PUBLIC_",
    }
  }
}

impl fmt::Display for Framework {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackageManager {
  Npm,
  Yarn,
  Pnpm,
}

impl PackageManager {
  pub fn command(self) -> &'static str {
    match self {
      PackageManager::Npm => "npm",
      PackageManager::Yarn => "yarn",
      PackageManager::Pnpm => "pnpm",
    }
  }

  pub fn run_script(self, script: &str) -> String {
    format!("{} run {}", self.command(), script)
  }

  /// Parses the leading token of an npm-style user-agent string, e.g.
  /// "pnpm/8.15.4 npm/? node/v20.11.1 linux x64".
  pub fn from_user_agent(user_agent: &str) -> Option<Self> {
    let product = user_agent.split('/').next()?;
    match product {
      "npm" => Some(PackageManager::Npm),
      "yarn" => Some(PackageManager::Yarn),
      "pnpm" => Some(PackageManager::Pnpm),
      _ => None,
    }
  }
}

impl fmt::Display for PackageManager {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.command())
  }
}

/// Sane default installer when the user did not choose one explicitly,
/// taken from the ambient `npm_config_user_agent` set by the invoking
/// package manager.
pub fn default_package_manager() -> PackageManager {
  env::var("npm_config_user_agent")
    .ok()
    .and_then(|ua| PackageManager::from_user_agent(&ua))
    .unwrap_or(PackageManager::Npm)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningOption {
  /// The user signs every transaction through their wallet.
  Explicit,
  /// Session-based signing without a per-transaction wallet popup.
  Seamless,
}

impl SigningOption {
  pub fn label(self) -> &'static str {
    match self {
      SigningOption::Explicit => "explicit",
      SigningOption::Seamless => "seamless",
    }
  }
}

impl fmt::Display for SigningOption {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TemplateId {
  Boilerplate,
  NftMinting,
  TokenMinting,
  TokenStaking,
  ClickerMiniApp,
  ContractBoilerplate,
}

/// One entry of the fixed template catalog. Defined once as static data;
/// templates have no lifecycle.
#[derive(Debug)]
pub struct TemplateDescriptor {
  pub id: TemplateId,
  pub display_name: &'static str,
  /// On-disk directory under the templates root (the Vite variant where a
  /// framework choice exists).
  pub dir: &'static str,
  /// Next.js variant directory, for templates that ship one.
  pub nextjs_dir: Option<&'static str>,
  pub doc_url: &'static str,
  pub video_url: Option<&'static str>,
  pub networks: &'static [Network],
  pub project_type: ProjectType,
  /// Whether the frontend framework is a user choice for this template.
  pub offers_framework_choice: bool,
  /// Whether a signing option must be selected (mini-app templates).
  pub requires_signing_option: bool,
}

impl TemplateDescriptor {
  pub fn dir_for(&self, framework: Option<Framework>) -> &'static str {
    match framework {
      Some(Framework::Nextjs) => self.nextjs_dir.unwrap_or(self.dir),
      _ => self.dir,
    }
  }
}

const ALL_NETWORKS: &[Network] = &[Network::Mainnet, Network::Testnet, Network::Devnet];
const NO_DEVNET: &[Network] = &[Network::Mainnet, Network::Testnet];

pub static CATALOG: [TemplateDescriptor; 6] = [
  TemplateDescriptor {
    id: TemplateId::Boilerplate,
    display_name: "Boilerplate dapp",
    dir: "boilerplate-template",
    nextjs_dir: Some("nextjs-boilerplate-template"),
    doc_url: "https://learn.aptoslabs.com/en/dapp-templates/boilerplate-template",
    video_url: None,
    networks: ALL_NETWORKS,
    project_type: ProjectType::Fullstack,
    offers_framework_choice: true,
    requires_signing_option: false,
  },
  TemplateDescriptor {
    id: TemplateId::NftMinting,
    display_name: "NFT minting dapp",
    dir: "nft-minting-dapp-template",
    nextjs_dir: None,
    doc_url: "https://learn.aptoslabs.com/en/dapp-templates/nft-minting-template",
    video_url: Some("https://www.youtube.com/watch?v=ik4GfZiw45M"),
    networks: NO_DEVNET,
    project_type: ProjectType::Fullstack,
    offers_framework_choice: false,
    requires_signing_option: false,
  },
  TemplateDescriptor {
    id: TemplateId::TokenMinting,
    display_name: "Token minting dapp",
    dir: "token-minting-dapp-template",
    nextjs_dir: None,
    doc_url: "https://learn.aptoslabs.com/en/dapp-templates/token-minting-template",
    video_url: Some("https://www.youtube.com/watch?v=cg0MNOnhXVc"),
    networks: NO_DEVNET,
    project_type: ProjectType::Fullstack,
    offers_framework_choice: false,
    requires_signing_option: false,
  },
  TemplateDescriptor {
    id: TemplateId::TokenStaking,
    display_name: "Token staking dapp",
    dir: "token-staking-dapp-template",
    nextjs_dir: None,
    doc_url: "https://learn.aptoslabs.com/en/dapp-templates/token-staking-template",
    video_url: None,
    networks: NO_DEVNET,
    project_type: ProjectType::Fullstack,
    offers_framework_choice: false,
    requires_signing_option: false,
  },
  TemplateDescriptor {
    id: TemplateId::ClickerMiniApp,
    display_name: "Clicker game Telegram mini-app",
    dir: "clicker-game-tg-mini-app-template",
    nextjs_dir: None,
    doc_url: "https://learn.aptoslabs.com/en/dapp-templates/clicker-game-tg-mini-app-template",
    video_url: None,
    networks: NO_DEVNET,
    project_type: ProjectType::Fullstack,
    offers_framework_choice: false,
    requires_signing_option: true,
  },
  TemplateDescriptor {
    id: TemplateId::ContractBoilerplate,
    display_name: "Contract boilerplate",
    dir: "contract-boilerplate-template",
    nextjs_dir: None,
    doc_url: "https://learn.aptoslabs.com/en/dapp-templates/boilerplate-template",
    video_url: None,
    networks: ALL_NETWORKS,
    project_type: ProjectType::Move,
    offers_framework_choice: false,
    requires_signing_option: false,
  },
];

impl TemplateId {
  pub fn descriptor(self) -> &'static TemplateDescriptor {
    match self {
      TemplateId::Boilerplate => &CATALOG[0],
      TemplateId::NftMinting => &CATALOG[1],
      TemplateId::TokenMinting => &CATALOG[2],
      TemplateId::TokenStaking => &CATALOG[3],
      TemplateId::ClickerMiniApp => &CATALOG[4],
      TemplateId::ContractBoilerplate => &CATALOG[5],
    }
  }
}

/// Live answer accumulator for the prompt collector. Every field is optional
/// until asked (or pre-supplied on the command line).
#[derive(Debug, Default, Clone)]
pub struct Draft {
  pub project_name: Option<String>,
  pub project_type: Option<ProjectType>,
  pub template: Option<TemplateId>,
  pub signing_option: Option<SigningOption>,
  pub framework: Option<Framework>,
  pub network: Option<Network>,
  pub use_surf: Option<bool>,
  pub api_key: Option<String>,
  pub package_manager: Option<PackageManager>,
}

/// The fully resolved answer set. Immutable once scaffolding begins.
#[derive(Debug, Clone)]
pub struct Selection {
  pub project_name: String,
  pub project_type: ProjectType,
  pub template: TemplateId,
  pub signing_option: Option<SigningOption>,
  pub framework: Option<Framework>,
  pub network: Network,
  pub use_surf: bool,
  pub api_key: Option<String>,
  pub package_manager: PackageManager,
}

impl Draft {
  /// Resolves the draft into a Selection, enforcing the completeness
  /// invariant: every field the template's option schema requires must be
  /// populated, and forbidden template/network combinations are rejected
  /// here, before anything reaches the scaffolder.
  pub fn finish(self) -> Result<Selection, ScaffoldError> {
    let project_name = self
      .project_name
      .ok_or(ScaffoldError::IncompleteSelection("project name"))?;
    let project_type = self
      .project_type
      .ok_or(ScaffoldError::IncompleteSelection("project type"))?;
    let template = self
      .template
      .ok_or(ScaffoldError::IncompleteSelection("template"))?;
    let descriptor = template.descriptor();

    if descriptor.project_type != project_type {
      return Err(ScaffoldError::TemplateTypeMismatch {
        template: descriptor.display_name.to_string(),
        project_type: project_type.to_string(),
      });
    }

    let network = self
      .network
      .ok_or(ScaffoldError::IncompleteSelection("network"))?;
    if !descriptor.networks.contains(&network) {
      return Err(ScaffoldError::UnsupportedCombination {
        template: descriptor.display_name.to_string(),
        network: network.to_string(),
      });
    }

    let framework = match project_type {
      ProjectType::Move => None,
      ProjectType::Fullstack => match self.framework {
        Some(framework) => Some(framework),
        // Templates without a framework degree of freedom are Vite apps.
        None if !descriptor.offers_framework_choice => Some(Framework::Vite),
        None => return Err(ScaffoldError::IncompleteSelection("framework")),
      },
    };

    let signing_option = if descriptor.requires_signing_option {
      Some(
        self
          .signing_option
          .ok_or(ScaffoldError::IncompleteSelection("signing option"))?,
      )
    } else {
      None
    };

    let package_manager = self
      .package_manager
      .ok_or(ScaffoldError::IncompleteSelection("package manager"))?;

    let api_key = self.api_key.and_then(|key| {
      let key = key.trim().to_string();
      if key.is_empty() {
        None
      } else {
        Some(key)
      }
    });

    Ok(Selection {
      project_name,
      project_type,
      template,
      signing_option,
      framework,
      network,
      use_surf: self.use_surf.unwrap_or(false),
      api_key,
      package_manager,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fullstack_draft() -> Draft {
    Draft {
      project_name: Some("demo".to_string()),
      project_type: Some(ProjectType::Fullstack),
      template: Some(TemplateId::Boilerplate),
      signing_option: None,
      framework: Some(Framework::Vite),
      network: Some(Network::Testnet),
      use_surf: Some(false),
      api_key: Some(String::new()),
      package_manager: Some(PackageManager::Npm),
    }
  }

  #[test]
  fn finish_resolves_complete_fullstack_draft() {
    let selection = fullstack_draft().finish().unwrap();
    assert_eq!(selection.project_name, "demo");
    assert_eq!(selection.framework, Some(Framework::Vite));
    assert_eq!(selection.api_key, None); // blank input means no key
  }

  #[test]
  fn finish_rejects_missing_network() {
    let mut draft = fullstack_draft();
    draft.network = None;
    assert!(matches!(
      draft.finish(),
      Err(ScaffoldError::IncompleteSelection("network"))
    ));
  }

  #[test]
  fn finish_rejects_devnet_for_minting_template() {
    let mut draft = fullstack_draft();
    draft.template = Some(TemplateId::NftMinting);
    draft.network = Some(Network::Devnet);
    assert!(matches!(
      draft.finish(),
      Err(ScaffoldError::UnsupportedCombination { .. })
    ));
  }

  #[test]
  fn finish_rejects_fullstack_template_for_move_project() {
    let mut draft = fullstack_draft();
    draft.project_type = Some(ProjectType::Move);
    assert!(matches!(
      draft.finish(),
      Err(ScaffoldError::TemplateTypeMismatch { .. })
    ));
  }

  #[test]
  fn finish_requires_signing_option_for_mini_app() {
    let mut draft = fullstack_draft();
    draft.template = Some(TemplateId::ClickerMiniApp);
    draft.framework = None;
    assert!(matches!(
      draft.finish(),
      Err(ScaffoldError::IncompleteSelection("signing option"))
    ));

    draft = fullstack_draft();
    draft.template = Some(TemplateId::ClickerMiniApp);
    draft.framework = None;
    draft.signing_option = Some(SigningOption::Explicit);
    let selection = draft.finish().unwrap();
    // Fixed-framework templates resolve to Vite.
    assert_eq!(selection.framework, Some(Framework::Vite));
  }

  #[test]
  fn move_draft_resolves_without_framework() {
    let draft = Draft {
      project_type: Some(ProjectType::Move),
      template: Some(TemplateId::ContractBoilerplate),
      framework: None,
      ..fullstack_draft()
    };
    let selection = draft.finish().unwrap();
    assert_eq!(selection.framework, None);
  }

  #[test]
  fn user_agent_parsing_picks_the_leading_product() {
    assert_eq!(
      PackageManager::from_user_agent("pnpm/8.15.4 npm/? node/v20.11.1 linux x64"),
      Some(PackageManager::Pnpm)
    );
    assert_eq!(
      PackageManager::from_user_agent("npm/10.2.4 node/v20.11.1 linux x64"),
      Some(PackageManager::Npm)
    );
    assert_eq!(PackageManager::from_user_agent("bun/1.0.0"), None);
  }

  #[test]
  fn mainnet_has_no_faucet() {
    assert!(Network::Mainnet.faucet_url().is_none());
    assert!(Network::Testnet.faucet_url().is_some());
    assert!(Network::Devnet.faucet_url().is_some());
  }
}
