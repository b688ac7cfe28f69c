// src/prompt.rs
use std::env;
use std::path::Path;
use std::sync::OnceLock;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use log::debug;
use regex::Regex;

use crate::catalog::{
  default_package_manager, Draft, Framework, Network, PackageManager, ProjectType, Selection,
  SigningOption, TemplateDescriptor, TemplateId, CATALOG,
};
use crate::error::ScaffoldError;

/// Manifest names are capped below this (npm registry rule).
pub const NAME_LENGTH_LIMIT: usize = 214;

/// Stable key for every question and review-menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  ProjectName,
  ProjectType,
  Template,
  SigningOption,
  Framework,
  Network,
  UseSurf,
  ApiKey,
  PackageManager,
}

/// One entry of the declarative question table: a stable key, a pure
/// visibility predicate over the answers so far, and the interactive runner.
pub struct Question {
  pub field: Field,
  pub applies: fn(&Draft) -> bool,
  ask: fn(&mut Draft) -> Result<(), ScaffoldError>,
}

pub const QUESTIONS: &[Question] = &[
  Question {
    field: Field::ProjectName,
    applies: asks_project_name,
    ask: ask_project_name,
  },
  Question {
    field: Field::ProjectType,
    applies: asks_project_type,
    ask: ask_project_type,
  },
  Question {
    field: Field::Template,
    applies: asks_template,
    ask: ask_template,
  },
  Question {
    field: Field::SigningOption,
    applies: asks_signing_option,
    ask: ask_signing_option,
  },
  Question {
    field: Field::Framework,
    applies: asks_framework,
    ask: ask_framework,
  },
  Question {
    field: Field::Network,
    applies: asks_network,
    ask: ask_network,
  },
  Question {
    field: Field::UseSurf,
    applies: asks_use_surf,
    ask: ask_use_surf,
  },
  Question {
    field: Field::ApiKey,
    applies: asks_api_key,
    ask: ask_api_key,
  },
  Question {
    field: Field::PackageManager,
    applies: asks_package_manager,
    ask: ask_package_manager,
  },
];

/// Walks the user through every applicable question, runs the review loop,
/// and resolves the final Selection. `seed` carries answers pre-supplied on
/// the command line; those questions are skipped.
pub fn collect(seed: Draft) -> Result<Selection, ScaffoldError> {
  let mut draft = seed;

  // A pre-supplied name skips the prompt, not the validation.
  if let Some(name) = &draft.project_name {
    let base_dir = env::current_dir()?;
    if let Err(reason) = validate_project_name(name, &base_dir) {
      return Err(ScaffoldError::InvalidProjectName {
        name: name.clone(),
        reason,
      });
    }
  }

  // A pre-supplied template implies the project type.
  if draft.project_type.is_none() {
    if let Some(template) = draft.template {
      draft.project_type = Some(template.descriptor().project_type);
    }
  }

  apply_implied(&mut draft);
  run_question_pass(&mut draft)?;

  loop {
    print_recap(&draft);
    let Some(field) = review_menu(&draft)? else {
      break;
    };
    debug!("Redoing field {:?}", field);
    reset_field(&mut draft, field);
    apply_implied(&mut draft);
    run_question_pass(&mut draft)?;
  }

  draft.finish()
}

fn run_question_pass(draft: &mut Draft) -> Result<(), ScaffoldError> {
  for question in QUESTIONS {
    if (question.applies)(draft) {
      debug!("Asking {:?}", question.field);
      (question.ask)(draft)?;
      apply_implied(draft);
    }
  }
  Ok(())
}

/// Normalizes answers that are implied rather than asked: a Move-only run
/// always uses the fixed contract boilerplate and has no frontend concerns.
pub fn apply_implied(draft: &mut Draft) {
  if draft.project_type == Some(ProjectType::Move) {
    let template_fits = draft
      .template
      .map_or(false, |t| t.descriptor().project_type == ProjectType::Move);
    if !template_fits {
      draft.template = Some(TemplateId::ContractBoilerplate);
    }
    draft.framework = None;
    draft.signing_option = None;
    draft.use_surf = None;
  }
}

// --- Visibility predicates (pure) ---

fn asks_project_name(draft: &Draft) -> bool {
  draft.project_name.is_none()
}

fn asks_project_type(draft: &Draft) -> bool {
  draft.project_type.is_none()
}

fn asks_template(draft: &Draft) -> bool {
  draft.project_type == Some(ProjectType::Fullstack) && draft.template.is_none()
}

fn asks_signing_option(draft: &Draft) -> bool {
  draft.signing_option.is_none()
    && draft
      .template
      .map_or(false, |t| t.descriptor().requires_signing_option)
}

fn asks_framework(draft: &Draft) -> bool {
  draft.framework.is_none()
    && draft.project_type == Some(ProjectType::Fullstack)
    && draft
      .template
      .map_or(false, |t| t.descriptor().offers_framework_choice)
}

fn asks_network(draft: &Draft) -> bool {
  draft.network.is_none() && draft.template.is_some()
}

fn asks_use_surf(draft: &Draft) -> bool {
  draft.use_surf.is_none() && draft.template == Some(TemplateId::Boilerplate)
}

fn asks_api_key(draft: &Draft) -> bool {
  draft.api_key.is_none()
}

fn asks_package_manager(draft: &Draft) -> bool {
  draft.package_manager.is_none()
}

// --- Choice sets (pure) ---

pub fn template_choices(draft: &Draft) -> Vec<&'static TemplateDescriptor> {
  let project_type = draft.project_type.unwrap_or(ProjectType::Fullstack);
  CATALOG
    .iter()
    .filter(|descriptor| descriptor.project_type == project_type)
    .collect()
}

pub fn network_choices(draft: &Draft) -> Vec<Network> {
  match draft.template {
    Some(template) => template.descriptor().networks.to_vec(),
    None => vec![Network::Mainnet, Network::Testnet, Network::Devnet],
  }
}

pub fn framework_choices(draft: &Draft) -> Vec<Framework> {
  match draft.template {
    Some(template) if template.descriptor().offers_framework_choice => {
      vec![Framework::Vite, Framework::Nextjs]
    }
    _ => vec![Framework::Vite],
  }
}

// --- Field transitions ---

/// Applies a newly chosen project type. Dependent answers are cleared only
/// when the previous template no longer fits the new type; their questions
/// are then re-asked with their own visibility logic.
pub fn change_project_type(draft: &mut Draft, new_type: ProjectType) {
  let template_fits = draft
    .template
    .map_or(false, |t| t.descriptor().project_type == new_type);
  draft.project_type = Some(new_type);
  if !template_fits {
    draft.template = None;
    draft.signing_option = None;
    draft.framework = None;
    draft.network = None;
    draft.use_surf = None;
  }
}

/// Applies a newly chosen template, invalidating answers the new template
/// constrains differently.
pub fn change_template(draft: &mut Draft, new_template: TemplateId) {
  let previous = draft.template.replace(new_template);
  if previous == Some(new_template) {
    return;
  }
  draft.signing_option = None;
  draft.framework = None;
  draft.use_surf = None;
  if let Some(network) = draft.network {
    if !new_template.descriptor().networks.contains(&network) {
      draft.network = None;
    }
  }
}

/// Per-field reset for the review loop. One explicit arm per field; the
/// conditional cascades live in the change_* handlers that run when the
/// question is re-answered.
pub fn reset_field(draft: &mut Draft, field: Field) {
  match field {
    Field::ProjectName => draft.project_name = None,
    Field::ProjectType => draft.project_type = None,
    Field::Template => draft.template = None,
    Field::SigningOption => draft.signing_option = None,
    Field::Framework => draft.framework = None,
    Field::Network => draft.network = None,
    Field::UseSurf => draft.use_surf = None,
    Field::ApiKey => draft.api_key = None,
    Field::PackageManager => draft.package_manager = None,
  }
}

/// Fields offered in the review menu for the current draft.
pub fn reviewable_fields(draft: &Draft) -> Vec<Field> {
  let mut fields = vec![Field::ProjectName, Field::ProjectType];
  if draft.project_type == Some(ProjectType::Fullstack) {
    fields.push(Field::Template);
  }
  if draft
    .template
    .map_or(false, |t| t.descriptor().requires_signing_option)
  {
    fields.push(Field::SigningOption);
  }
  if draft
    .template
    .map_or(false, |t| t.descriptor().offers_framework_choice)
  {
    fields.push(Field::Framework);
  }
  fields.push(Field::Network);
  if draft.template == Some(TemplateId::Boilerplate) {
    fields.push(Field::UseSurf);
  }
  fields.push(Field::ApiKey);
  fields.push(Field::PackageManager);
  fields
}

fn field_label(field: Field) -> &'static str {
  match field {
    Field::ProjectName => "Project name",
    Field::ProjectType => "Project type",
    Field::Template => "Template",
    Field::SigningOption => "Signing option",
    Field::Framework => "Framework",
    Field::Network => "Network",
    Field::UseSurf => "Surf bindings",
    Field::ApiKey => "API key",
    Field::PackageManager => "Package manager",
  }
}

// --- Validation ---

static NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
  NAME_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("static pattern"))
}

/// Inline project-name validation: non-empty, URL-safe, under the length
/// limit, and not colliding with an existing directory entry.
pub fn validate_project_name(name: &str, base_dir: &Path) -> Result<(), String> {
  if name.trim().is_empty() {
    return Err("Project name cannot be empty.".to_string());
  }
  if name.len() >= NAME_LENGTH_LIMIT {
    return Err(format!(
      "Project name must be shorter than {} characters.",
      NAME_LENGTH_LIMIT
    ));
  }
  if !name_regex().is_match(name) {
    return Err(
      "Project name may only contain letters, digits, '.', '_' and '-'.".to_string(),
    );
  }
  if base_dir.join(name).exists() {
    return Err(format!(
      "'{}' already exists in this directory. Choose a different name.",
      name
    ));
  }
  Ok(())
}

// --- Interactive runners ---

fn ask_project_name(draft: &mut Draft) -> Result<(), ScaffoldError> {
  let base_dir = env::current_dir()?;
  let name = Input::<String>::with_theme(&ColorfulTheme::default())
    .with_prompt("Project name")
    .validate_with(move |input: &String| validate_project_name(input, &base_dir))
    .interact_text()?;
  draft.project_name = Some(name);
  Ok(())
}

fn ask_project_type(draft: &mut Draft) -> Result<(), ScaffoldError> {
  let options = [ProjectType::Fullstack, ProjectType::Move];
  let labels = [
    "Full-stack dapp (contract + frontend)",
    "Contract only (Move)",
  ];
  let picked = Select::with_theme(&ColorfulTheme::default())
    .with_prompt("What are you building?")
    .items(&labels)
    .default(0)
    .interact_opt()?
    .ok_or(ScaffoldError::Cancelled)?;
  change_project_type(draft, options[picked]);
  Ok(())
}

fn ask_template(draft: &mut Draft) -> Result<(), ScaffoldError> {
  let choices = template_choices(draft);
  let labels: Vec<&str> = choices.iter().map(|d| d.display_name).collect();
  let picked = Select::with_theme(&ColorfulTheme::default())
    .with_prompt("Choose a template")
    .items(&labels)
    .default(0)
    .interact_opt()?
    .ok_or(ScaffoldError::Cancelled)?;
  change_template(draft, choices[picked].id);
  Ok(())
}

fn ask_signing_option(draft: &mut Draft) -> Result<(), ScaffoldError> {
  let options = [SigningOption::Explicit, SigningOption::Seamless];
  let labels = [
    "Explicit: the user approves every transaction in their wallet",
    "Seamless: a session key signs in the background",
  ];
  let picked = Select::with_theme(&ColorfulTheme::default())
    .with_prompt("How should transactions be signed?")
    .items(&labels)
    .default(0)
    .interact_opt()?
    .ok_or(ScaffoldError::Cancelled)?;
  draft.signing_option = Some(options[picked]);
  Ok(())
}

fn ask_framework(draft: &mut Draft) -> Result<(), ScaffoldError> {
  let choices = framework_choices(draft);
  let labels: Vec<&str> = choices.iter().map(|f| f.label()).collect();
  let picked = Select::with_theme(&ColorfulTheme::default())
    .with_prompt("Choose a frontend framework")
    .items(&labels)
    .default(0)
    .interact_opt()?
    .ok_or(ScaffoldError::Cancelled)?;
  draft.framework = Some(choices[picked]);
  Ok(())
}

fn ask_network(draft: &mut Draft) -> Result<(), ScaffoldError> {
  let choices = network_choices(draft);
  let labels: Vec<&str> = choices.iter().map(|n| n.wire_name()).collect();
  // Default to testnet where available.
  let default_index = choices
    .iter()
    .position(|n| *n == Network::Testnet)
    .unwrap_or(0);
  let picked = Select::with_theme(&ColorfulTheme::default())
    .with_prompt("Choose a network")
    .items(&labels)
    .default(default_index)
    .interact_opt()?
    .ok_or(ScaffoldError::Cancelled)?;
  draft.network = Some(choices[picked]);
  Ok(())
}

fn ask_use_surf(draft: &mut Draft) -> Result<(), ScaffoldError> {
  let use_surf = Confirm::with_theme(&ColorfulTheme::default())
    .with_prompt("Generate type-safe contract bindings with Surf?")
    .default(false)
    .interact_opt()?
    .ok_or(ScaffoldError::Cancelled)?;
  draft.use_surf = Some(use_surf);
  Ok(())
}

fn ask_api_key(draft: &mut Draft) -> Result<(), ScaffoldError> {
  let key = Input::<String>::with_theme(&ColorfulTheme::default())
    .with_prompt("Fullnode API key (leave empty to skip)")
    .allow_empty(true)
    .interact_text()?;
  draft.api_key = Some(key);
  Ok(())
}

fn ask_package_manager(draft: &mut Draft) -> Result<(), ScaffoldError> {
  let options = [
    PackageManager::Npm,
    PackageManager::Yarn,
    PackageManager::Pnpm,
  ];
  let labels: Vec<&str> = options.iter().map(|pm| pm.command()).collect();
  let ambient = default_package_manager();
  let default_index = options.iter().position(|pm| *pm == ambient).unwrap_or(0);
  let picked = Select::with_theme(&ColorfulTheme::default())
    .with_prompt("Choose a package manager")
    .items(&labels)
    .default(default_index)
    .interact_opt()?
    .ok_or(ScaffoldError::Cancelled)?;
  draft.package_manager = Some(options[picked]);
  Ok(())
}

// --- Review loop ---

fn print_recap(draft: &Draft) {
  fn shown<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
      .as_ref()
      .map_or_else(|| "-".to_string(), |v| v.to_string())
  }

  println!("\nProject summary:");
  println!("  {:<17} {}", "Name:", shown(&draft.project_name));
  println!("  {:<17} {}", "Type:", shown(&draft.project_type));
  println!(
    "  {:<17} {}",
    "Template:",
    draft
      .template
      .map_or("-", |t| t.descriptor().display_name)
  );
  if let Some(signing) = draft.signing_option {
    println!("  {:<17} {}", "Signing:", signing);
  }
  if let Some(framework) = draft.framework {
    println!("  {:<17} {}", "Framework:", framework);
  }
  println!("  {:<17} {}", "Network:", shown(&draft.network));
  if draft.template == Some(TemplateId::Boilerplate) {
    println!(
      "  {:<17} {}",
      "Surf bindings:",
      draft.use_surf.map_or("-".to_string(), |v| v.to_string())
    );
  }
  println!(
    "  {:<17} {}",
    "API key:",
    draft
      .api_key
      .as_deref()
      .filter(|k| !k.trim().is_empty())
      .unwrap_or("(none)")
  );
  println!("  {:<17} {}", "Package manager:", shown(&draft.package_manager));
  println!();
}

/// Returns the field the user wants to change, or None once confirmed.
fn review_menu(draft: &Draft) -> Result<Option<Field>, ScaffoldError> {
  let fields = reviewable_fields(draft);
  let mut labels = vec!["Looks good, scaffold it"];
  labels.extend(fields.iter().map(|f| field_label(*f)));

  let picked = Select::with_theme(&ColorfulTheme::default())
    .with_prompt("Anything to change?")
    .items(&labels)
    .default(0)
    .interact_opt()?
    .ok_or(ScaffoldError::Cancelled)?;

  if picked == 0 {
    Ok(None)
  } else {
    Ok(Some(fields[picked - 1]))
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
      framework: Some(Framework::Nextjs),
      network: Some(Network::Devnet),
      use_surf: Some(true),
      api_key: Some(String::new()),
      package_manager: Some(PackageManager::Npm),
    }
  }

  #[test]
  fn name_validation_accepts_url_safe_names() {
    let dir = tempfile::tempdir().unwrap();
    assert!(validate_project_name("my-dapp_2.0", dir.path()).is_ok());
  }

  #[test]
  fn name_validation_rejects_empty_and_overlong_names() {
    let dir = tempfile::tempdir().unwrap();
    assert!(validate_project_name("", dir.path())
      .unwrap_err()
      .contains("empty"));
    let long = "a".repeat(NAME_LENGTH_LIMIT);
    assert!(validate_project_name(&long, dir.path())
      .unwrap_err()
      .contains("shorter than 214"));
    // One below the limit is fine.
    let just_under = "a".repeat(NAME_LENGTH_LIMIT - 1);
    assert!(validate_project_name(&just_under, dir.path()).is_ok());
  }

  #[test]
  fn name_validation_rejects_unsafe_characters() {
    let dir = tempfile::tempdir().unwrap();
    assert!(validate_project_name("my app", dir.path()).is_err());
    assert!(validate_project_name("demo/x", dir.path()).is_err());
  }

  #[test]
  fn name_validation_rejects_existing_directories() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("taken")).unwrap();
    assert!(validate_project_name("taken", dir.path())
      .unwrap_err()
      .contains("already exists"));
  }

  #[test]
  fn template_choices_follow_the_project_type() {
    let mut draft = fullstack_draft();
    let names: Vec<_> = template_choices(&draft).iter().map(|d| d.id).collect();
    assert!(names.contains(&TemplateId::Boilerplate));
    assert!(!names.contains(&TemplateId::ContractBoilerplate));

    draft.project_type = Some(ProjectType::Move);
    let names: Vec<_> = template_choices(&draft).iter().map(|d| d.id).collect();
    assert_eq!(names, vec![TemplateId::ContractBoilerplate]);
  }

  #[test]
  fn network_choices_narrow_for_minting_templates() {
    let mut draft = fullstack_draft();
    draft.template = Some(TemplateId::NftMinting);
    let networks = network_choices(&draft);
    assert!(!networks.contains(&Network::Devnet));
    assert!(networks.contains(&Network::Testnet));
  }

  #[test]
  fn framework_choice_only_exists_for_the_boilerplate() {
    let mut draft = fullstack_draft();
    assert_eq!(
      framework_choices(&draft),
      vec![Framework::Vite, Framework::Nextjs]
    );
    draft.template = Some(TemplateId::TokenStaking);
    assert_eq!(framework_choices(&draft), vec![Framework::Vite]);
  }

  #[test]
  fn fullstack_to_move_forces_the_contract_boilerplate() {
    let mut draft = fullstack_draft();
    change_project_type(&mut draft, ProjectType::Move);
    apply_implied(&mut draft);

    assert_eq!(draft.template, Some(TemplateId::ContractBoilerplate));
    assert_eq!(draft.framework, None);
    assert_eq!(draft.use_surf, None);

    // Regardless of the earlier template choice, the resolved selection
    // carries the fixed contract boilerplate.
    draft.network = Some(Network::Testnet);
    let selection = draft.finish().unwrap();
    assert_eq!(selection.template, TemplateId::ContractBoilerplate);
  }

  #[test]
  fn move_to_fullstack_reasks_template_network_and_framework() {
    let mut draft = fullstack_draft();
    change_project_type(&mut draft, ProjectType::Move);
    apply_implied(&mut draft);

    change_project_type(&mut draft, ProjectType::Fullstack);
    assert_eq!(draft.template, None);
    assert_eq!(draft.network, None);
    assert_eq!(draft.framework, None);
    assert!(asks_template(&draft));
    assert!(!asks_network(&draft)); // waits until a template narrows choices
  }

  #[test]
  fn reelecting_the_same_project_type_keeps_the_answers() {
    let mut draft = fullstack_draft();
    change_project_type(&mut draft, ProjectType::Fullstack);
    assert_eq!(draft.template, Some(TemplateId::Boilerplate));
    assert_eq!(draft.network, Some(Network::Devnet));
  }

  #[test]
  fn template_change_invalidates_constrained_answers() {
    let mut draft = fullstack_draft(); // Next.js + devnet
    change_template(&mut draft, TemplateId::NftMinting);

    assert_eq!(draft.framework, None);
    assert_eq!(draft.use_surf, None);
    // devnet is not allowed for the minting template
    assert_eq!(draft.network, None);
  }

  #[test]
  fn template_change_keeps_a_still_valid_network() {
    let mut draft = fullstack_draft();
    draft.network = Some(Network::Testnet);
    change_template(&mut draft, TemplateId::TokenMinting);
    assert_eq!(draft.network, Some(Network::Testnet));
  }

  #[test]
  fn review_menu_fields_track_the_draft_shape() {
    let draft = fullstack_draft();
    let fields = reviewable_fields(&draft);
    assert!(fields.contains(&Field::Template));
    assert!(fields.contains(&Field::Framework));
    assert!(fields.contains(&Field::UseSurf));

    let mut move_draft = fullstack_draft();
    change_project_type(&mut move_draft, ProjectType::Move);
    apply_implied(&mut move_draft);
    let fields = reviewable_fields(&move_draft);
    assert!(!fields.contains(&Field::Template));
    assert!(!fields.contains(&Field::Framework));
    assert!(!fields.contains(&Field::UseSurf));
    assert!(fields.contains(&Field::Network));
  }

  #[test]
  fn question_table_visibility_matches_the_draft() {
    let mut draft = Draft::default();
    // Nothing answered: only the first questions apply.
    assert!(asks_project_name(&draft));
    assert!(asks_project_type(&draft));
    assert!(!asks_template(&draft));
    assert!(!asks_signing_option(&draft));

    draft.project_type = Some(ProjectType::Fullstack);
    assert!(asks_template(&draft));

    draft.template = Some(TemplateId::ClickerMiniApp);
    assert!(asks_signing_option(&draft));
    assert!(!asks_framework(&draft)); // mini-app is Vite-only
    assert!(!asks_use_surf(&draft));
  }
}
