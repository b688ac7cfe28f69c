// src/env_file.rs
use std::fmt::Write;

use crate::account::{FundingOutcome, PublisherAccount};
use crate::catalog::{Network, ProjectType, Selection, SigningOption, TemplateId};
use crate::error::ScaffoldError;

/// Renders the `.env` content for the chosen template/framework combination.
/// Pure function of (selection, account, funding outcome); the caller owns
/// the single write to disk.
pub fn render_env_file(
  selection: &Selection,
  account: &PublisherAccount,
  funding: &FundingOutcome,
) -> Result<String, ScaffoldError> {
  let prefix = env_prefix(selection)?;

  // Mainnet never receives generated key material: the publisher fields are
  // emitted as empty placeholders for the user to fill in deliberately.
  let (address, private_key) = match selection.network {
    Network::Mainnet => ("", ""),
    Network::Testnet | Network::Devnet => {
      (account.address.as_str(), account.private_key.as_str())
    }
  };

  let mut content = String::new();
  push_var(&mut content, "", "PROJECT_NAME", &selection.project_name);
  push_var(&mut content, prefix, "APP_NETWORK", selection.network.wire_name());
  push_var(
    &mut content,
    prefix,
    "APTOS_API_KEY",
    selection.api_key.as_deref().unwrap_or(""),
  );
  push_var(
    &mut content,
    prefix,
    "MODULE_PUBLISHER_ACCOUNT_ADDRESS",
    address,
  );
  push_var(
    &mut content,
    prefix,
    "MODULE_PUBLISHER_ACCOUNT_PRIVATE_KEY",
    private_key,
  );

  if let FundingOutcome::Failed(_) = funding {
    content
      .push_str("# The faucet request failed. Fund the publisher account before publishing.\n");
  }

  content.push('\n');
  content.push_str(&template_extras(selection, prefix));

  Ok(content)
}

fn push_var(content: &mut String, prefix: &str, key: &str, value: &str) {
  // Infallible for String targets.
  let _ = writeln!(content, "{}{}={}", prefix, key, value);
}

/// The env-var naming convention is owned by the framework. A full-stack
/// selection without a resolved framework is a hard error, never a silent
/// default.
fn env_prefix(selection: &Selection) -> Result<&'static str, ScaffoldError> {
  match selection.project_type {
    ProjectType::Move => Ok(""),
    ProjectType::Fullstack => match selection.framework {
      Some(framework) => Ok(framework.env_prefix()),
      None => Err(ScaffoldError::MissingFramework {
        template: selection.template.descriptor().display_name.to_string(),
      }),
    },
  }
}

/// Per-template variables appended after the core block: placeholders the
/// user fills in after deploying, plus service-specific IDs. The match is
/// exhaustive over the catalog, so an unmapped template cannot exist.
fn template_extras(selection: &Selection, prefix: &str) -> String {
  let mut extras = String::new();
  match selection.template {
    TemplateId::Boilerplate | TemplateId::ContractBoilerplate => {
      extras.push_str("# Fill in after publishing the contract\n");
      push_var(&mut extras, prefix, "MODULE_ADDRESS", "");
    }
    TemplateId::NftMinting => {
      extras.push_str("# Fill in after creating the collection\n");
      push_var(&mut extras, prefix, "COLLECTION_CREATOR_ADDRESS", "");
      push_var(&mut extras, prefix, "COLLECTION_ADDRESS", "");
    }
    TemplateId::TokenMinting => {
      extras.push_str("# Fill in after creating the fungible asset\n");
      push_var(&mut extras, prefix, "FA_CREATOR_ADDRESS", "");
      push_var(&mut extras, prefix, "FA_ADDRESS", "");
    }
    TemplateId::TokenStaking => {
      extras.push_str("# Fill in with the asset under staking\n");
      push_var(&mut extras, prefix, "FA_ADDRESS", "");
      push_var(&mut extras, prefix, "REWARD_CREATOR_ADDRESS", "");
    }
    TemplateId::ClickerMiniApp => {
      extras.push_str("# Telegram bot credentials\n");
      push_var(&mut extras, prefix, "TELEGRAM_BOT_TOKEN", "");
      if selection.signing_option == Some(SigningOption::Seamless) {
        push_var(&mut extras, prefix, "MIZU_WALLET_APP_ID", "");
      }
    }
  }
  extras
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{Framework, PackageManager};

  fn selection(
    project_type: ProjectType,
    template: TemplateId,
    network: Network,
    framework: Option<Framework>,
  ) -> Selection {
    Selection {
      project_name: "demo".to_string(),
      project_type,
      template,
      signing_option: None,
      framework,
      network,
      use_surf: false,
      api_key: None,
      package_manager: PackageManager::Npm,
    }
  }

  fn funded_account() -> PublisherAccount {
    PublisherAccount::generate()
  }

  #[test]
  fn vite_testnet_env_has_prefixed_populated_credentials() {
    let selection = selection(
      ProjectType::Fullstack,
      TemplateId::Boilerplate,
      Network::Testnet,
      Some(Framework::Vite),
    );
    let account = funded_account();
    let content = render_env_file(&selection, &account, &FundingOutcome::Funded).unwrap();

    assert!(content.contains("PROJECT_NAME=demo\n"));
    assert!(content.contains("VITE_APP_NETWORK=testnet\n"));
    assert!(content.contains(&format!(
      "VITE_MODULE_PUBLISHER_ACCOUNT_ADDRESS={}\n",
      account.address
    )));
    assert!(content.contains(&format!(
      "VITE_MODULE_PUBLISHER_ACCOUNT_PRIVATE_KEY={}\n",
      account.private_key
    )));
    assert!(content.contains("VITE_MODULE_ADDRESS=\n"));
  }

  #[test]
  fn nextjs_uses_its_own_prefix() {
    let selection = selection(
      ProjectType::Fullstack,
      TemplateId::Boilerplate,
      Network::Devnet,
      Some(Framework::Nextjs),
    );
    let content =
      render_env_file(&selection, &funded_account(), &FundingOutcome::Funded).unwrap();
    assert!(content.contains("NEXT_PUBLIC_APP_NETWORK=devnet\n"));
    assert!(!content.contains("VITE_"));
  }

  #[test]
  fn mainnet_emits_empty_placeholders() {
    let selection = selection(
      ProjectType::Fullstack,
      TemplateId::Boilerplate,
      Network::Mainnet,
      Some(Framework::Vite),
    );
    let account = funded_account();
    let content =
      render_env_file(&selection, &account, &FundingOutcome::SkippedMainnet).unwrap();

    assert!(content.contains("VITE_MODULE_PUBLISHER_ACCOUNT_ADDRESS=\n"));
    assert!(content.contains("VITE_MODULE_PUBLISHER_ACCOUNT_PRIVATE_KEY=\n"));
    assert!(!content.contains(&account.address));
    assert!(!content.contains(&account.private_key));
  }

  #[test]
  fn move_mainnet_env_is_unprefixed_and_empty() {
    let selection = selection(
      ProjectType::Move,
      TemplateId::ContractBoilerplate,
      Network::Mainnet,
      None,
    );
    let content = render_env_file(
      &selection,
      &funded_account(),
      &FundingOutcome::SkippedMainnet,
    )
    .unwrap();

    assert!(content.contains("APP_NETWORK=mainnet\n"));
    assert!(content.contains("MODULE_PUBLISHER_ACCOUNT_ADDRESS=\n"));
    assert!(!content.contains("VITE_"));
  }

  #[test]
  fn fullstack_without_framework_is_a_hard_error() {
    let selection = selection(
      ProjectType::Fullstack,
      TemplateId::Boilerplate,
      Network::Testnet,
      None,
    );
    assert!(matches!(
      render_env_file(&selection, &funded_account(), &FundingOutcome::Funded),
      Err(ScaffoldError::MissingFramework { .. })
    ));
  }

  #[test]
  fn funding_failure_adds_a_manual_funding_note() {
    let selection = selection(
      ProjectType::Fullstack,
      TemplateId::Boilerplate,
      Network::Testnet,
      Some(Framework::Vite),
    );
    let content = render_env_file(
      &selection,
      &funded_account(),
      &FundingOutcome::Failed("503".to_string()),
    )
    .unwrap();
    assert!(content.contains("faucet request failed"));
  }

  #[test]
  fn seamless_mini_app_gets_the_wallet_service_id() {
    let mut selection = selection(
      ProjectType::Fullstack,
      TemplateId::ClickerMiniApp,
      Network::Testnet,
      Some(Framework::Vite),
    );
    selection.signing_option = Some(SigningOption::Seamless);
    let content =
      render_env_file(&selection, &funded_account(), &FundingOutcome::Funded).unwrap();
    assert!(content.contains("VITE_TELEGRAM_BOT_TOKEN=\n"));
    assert!(content.contains("VITE_MIZU_WALLET_APP_ID=\n"));

    selection.signing_option = Some(SigningOption::Explicit);
    let content =
      render_env_file(&selection, &funded_account(), &FundingOutcome::Funded).unwrap();
    assert!(!content.contains("MIZU_WALLET_APP_ID"));
  }
}
