// src/scaffold.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dialoguer::{theme::ColorfulTheme, Confirm};
use duct::cmd;
use heck::ToKebabCase;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use walkdir::WalkDir;

use crate::account::{fund_publisher, FundingOutcome, PublisherAccount};
use crate::catalog::{Framework, PackageManager, ProjectType, Selection};
use crate::env_file::render_env_file;
use crate::error::{RunContext, ScaffoldError};
use crate::shell::{host_shell, ShellCommands};

/// Entries never copied out of a template tree, matched by path component
/// name: OS droppings, dependency caches, lockfiles, prior build output and
/// any pre-existing env file.
const EXCLUDED_ENTRIES: &[&str] = &[
  ".DS_Store",
  "node_modules",
  ".next",
  "dist",
  "build",
  "package-lock.json",
  "yarn.lock",
  "pnpm-lock.yaml",
  ".env",
  ".aptos",
];

/// Dotfiles are stored under non-dot names so tooling leaves them alone
/// inside the template tree; they are renamed on write.
const FILE_NAME_REMAPS: &[(&str, &str)] = &[
  ("_gitignore", ".gitignore"),
  ("_eslintrc.cjs", ".eslintrc.cjs"),
  ("_prettierrc", ".prettierrc"),
];

/// Materializes a validated Selection into a project directory. Side effects
/// run in a fixed order; any failure aborts with an error naming the step
/// and leaves partial output in place.
pub fn run_scaffold(
  selection: &Selection,
  templates_dir: &Path,
  ctx: &mut RunContext,
) -> Result<(), ScaffoldError> {
  let destination = env::current_dir()?.join(&selection.project_name);
  ctx.destination = Some(destination.clone());
  debug!("Destination resolved to {}", destination.display());

  prepare_destination(&destination, || confirm_overwrite(&destination))?;

  let descriptor = selection.template.descriptor();
  let template_path = templates_dir.join(descriptor.dir_for(selection.framework));
  if !template_path.is_dir() {
    return Err(ScaffoldError::TemplateDirNotFound(template_path));
  }

  info!(
    "Copying template '{}' from {}",
    descriptor.display_name,
    template_path.display()
  );
  copy_template_tree(&template_path, &destination)?;

  rewrite_manifest(&destination, selection)?;

  if selection.project_type == ProjectType::Fullstack {
    install_dependencies(&destination, selection.package_manager)?;
  }

  let account = PublisherAccount::generate();
  let funding = fund_publisher(&account, selection.network);
  if let FundingOutcome::Failed(reason) = &funding {
    warn!(
      "Faucet funding failed: {}. The credentials are written unfunded; fund the account manually before publishing.",
      reason
    );
  }
  let env_content = render_env_file(selection, &account, &funding)?;
  fs::write(destination.join(".env"), env_content)?;
  info!("Wrote {}", destination.join(".env").display());

  print_next_steps(selection, &destination, &funding);
  Ok(())
}

/// Creates the destination directory, or asks before scaffolding into an
/// existing one. `confirm_overwrite` is injected so the decision is
/// testable without a terminal.
pub fn prepare_destination<F>(destination: &Path, confirm_overwrite: F) -> Result<(), ScaffoldError>
where
  F: FnOnce() -> Result<bool, ScaffoldError>,
{
  if destination.exists() {
    if !destination.is_dir() {
      return Err(ScaffoldError::DestinationNotADirectory(
        destination.to_path_buf(),
      ));
    }
    if !confirm_overwrite()? {
      return Err(ScaffoldError::DestinationExists(destination.to_path_buf()));
    }
    warn!(
      "Scaffolding into existing directory '{}'; files may be overwritten.",
      destination.display()
    );
    return Ok(());
  }

  fs::create_dir_all(destination).map_err(|e| ScaffoldError::OutputDirCreation {
    path: destination.to_path_buf(),
    source: e,
  })
}

fn confirm_overwrite(destination: &Path) -> Result<bool, ScaffoldError> {
  Ok(
    Confirm::with_theme(&ColorfulTheme::default())
      .with_prompt(format!(
        "Directory '{}' already exists. Overwrite its contents?",
        destination.display()
      ))
      .default(false)
      .interact_opt()?
      .unwrap_or(false),
  )
}

fn is_excluded(name: &str) -> bool {
  EXCLUDED_ENTRIES.contains(&name)
}

fn remap_file_name(name: &str) -> &str {
  FILE_NAME_REMAPS
    .iter()
    .find(|(from, _)| *from == name)
    .map_or(name, |(_, to)| to)
}

fn remap_relative_path(relative: &Path) -> PathBuf {
  match relative.file_name().and_then(|n| n.to_str()) {
    Some(name) => {
      let mapped = remap_file_name(name);
      if mapped == name {
        relative.to_path_buf()
      } else {
        relative.with_file_name(mapped)
      }
    }
    None => relative.to_path_buf(),
  }
}

/// Recursively copies the template tree into the destination, preserving
/// directory structure, honoring the exclusion set and applying filename
/// remaps on write.
pub fn copy_template_tree(template_path: &Path, output_path: &Path) -> Result<(), ScaffoldError> {
  debug!(
    "Copying template from {} to {}",
    template_path.display(),
    output_path.display()
  );

  // --- Pass 1: count files respecting exclusions ---
  let file_count = count_template_files(template_path)?;
  debug!("Total files to copy: {}", file_count);

  let pb = ProgressBar::new(file_count);
  pb.set_style(
    ProgressStyle::default_bar()
      .template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
      )
      .expect("static progress bar template")
      .progress_chars("#>-"),
  );
  pb.set_message("Copying files...");

  // --- Pass 2: copy with progress ---
  let mut walker = WalkDir::new(template_path).into_iter();
  loop {
    let entry_result = match walker.next() {
      Some(res) => res,
      None => break,
    };
    let entry = entry_result.map_err(|e| ScaffoldError::WalkDir {
      path: template_path.to_path_buf(),
      source: e,
    })?;

    let current_path = entry.path();
    if current_path == template_path {
      continue;
    }

    if let Some(entry_name) = current_path.file_name().and_then(|n| n.to_str()) {
      if is_excluded(entry_name) {
        debug!("Excluding '{}'", current_path.display());
        if entry.file_type().is_dir() {
          walker.skip_current_dir();
        }
        continue;
      }
    }

    let relative_path = match current_path.strip_prefix(template_path) {
      Ok(p) => p,
      Err(_) => continue,
    };
    let output_entry_path = output_path.join(remap_relative_path(relative_path));

    if entry.file_type().is_dir() {
      trace!("Creating directory: {}", output_entry_path.display());
      fs::create_dir_all(&output_entry_path).map_err(|e| ScaffoldError::OutputDirCreation {
        path: output_entry_path.clone(),
        source: e,
      })?;
    } else if entry.file_type().is_file() {
      pb.set_message(format!("Copying {}", relative_path.display()));
      if let Some(parent) = output_entry_path.parent() {
        if !parent.exists() {
          fs::create_dir_all(parent)?;
        }
      }
      fs::copy(current_path, &output_entry_path)?;
      pb.inc(1);
    } else {
      trace!("Skipping non-file entry: {}", current_path.display());
    }
  }

  pb.finish_with_message("Template copy complete.");
  Ok(())
}

fn count_template_files(template_path: &Path) -> Result<u64, ScaffoldError> {
  let mut file_count: u64 = 0;
  let mut walker = WalkDir::new(template_path).into_iter();
  loop {
    let entry_result = match walker.next() {
      Some(res) => res,
      None => break,
    };
    let entry = entry_result.map_err(|e| ScaffoldError::WalkDir {
      path: template_path.to_path_buf(),
      source: e,
    })?;

    if entry.path() == template_path {
      continue;
    }
    if let Some(entry_name) = entry.path().file_name().and_then(|n| n.to_str()) {
      if is_excluded(entry_name) {
        if entry.file_type().is_dir() {
          walker.skip_current_dir();
        }
        continue;
      }
    }
    if entry.file_type().is_file() {
      file_count += 1;
    }
  }
  Ok(file_count)
}

/// The slice of package.json this tool rewrites; everything else rides
/// along untouched.
#[derive(Debug, Serialize, Deserialize)]
struct PackageManifest {
  name: String,
  #[serde(default)]
  scripts: Map<String, Value>,
  #[serde(flatten)]
  rest: Map<String, Value>,
}

/// Rewrites the copied template's root manifest: project name, framework
/// run scripts, and the chain-interaction scripts rendered through the
/// host-shell strategy.
pub fn rewrite_manifest(destination: &Path, selection: &Selection) -> Result<(), ScaffoldError> {
  let manifest_path = destination.join("package.json");
  let raw = fs::read_to_string(&manifest_path).map_err(|e| ScaffoldError::ManifestRead {
    manifest_path: manifest_path.clone(),
    source: e,
  })?;
  let mut manifest: PackageManifest =
    serde_json::from_str(&raw).map_err(|e| ScaffoldError::ManifestParse {
      manifest_path: manifest_path.clone(),
      source: e,
    })?;

  manifest.name = selection.project_name.to_kebab_case();

  let shell = host_shell();
  let network = selection.network.wire_name();
  let network_env: &[(&str, &str)] = &[("APTOS_NETWORK", network)];

  manifest.scripts.insert(
    "move:init".to_string(),
    Value::String(format!("aptos init --network {}", network)),
  );
  manifest.scripts.insert(
    "move:compile".to_string(),
    Value::String(shell.set_env_and_run(network_env, "aptos move compile --package-dir contract")),
  );
  manifest.scripts.insert(
    "move:test".to_string(),
    Value::String("aptos move test --package-dir contract".to_string()),
  );
  manifest.scripts.insert(
    "move:publish".to_string(),
    Value::String(shell.set_env_and_run(network_env, "aptos move publish --package-dir contract")),
  );

  if selection.project_type == ProjectType::Fullstack {
    let (dev, start) = match selection.framework {
      Some(Framework::Nextjs) => ("next dev", "next start"),
      _ => ("vite", "vite preview"),
    };
    manifest
      .scripts
      .insert("dev".to_string(), Value::String(dev.to_string()));
    manifest
      .scripts
      .insert("start".to_string(), Value::String(start.to_string()));
    if selection.use_surf {
      // Surf needs the compiled ABI, so compile right after install.
      manifest.scripts.insert(
        "postinstall".to_string(),
        Value::String(selection.package_manager.run_script("move:compile")),
      );
    }
  }

  let mut rendered =
    serde_json::to_string_pretty(&manifest).map_err(|e| ScaffoldError::StepFailed {
      step: "manifest rewrite",
      source: Box::new(e),
    })?;
  rendered.push('\n');
  fs::write(&manifest_path, rendered)?;
  info!("Updated project manifest {}", manifest_path.display());
  Ok(())
}

/// Runs the package manager's install command as a blocking subprocess in
/// the destination directory, inheriting stdio so the user sees installer
/// output live.
pub fn install_dependencies(
  destination: &Path,
  package_manager: PackageManager,
) -> Result<(), ScaffoldError> {
  let shell = host_shell();
  let install = shell.install_command(package_manager);
  let (program, flag) = shell.shell_invocation();

  info!("Installing dependencies with `{}`...", install);
  let output = cmd!(program, flag, &install)
    .dir(destination)
    .unchecked()
    .run()
    .map_err(|e| ScaffoldError::StepFailed {
      step: "dependency installation",
      source: Box::new(e),
    })?;

  if !output.status.success() {
    return Err(ScaffoldError::InstallFailed {
      package_manager: package_manager.to_string(),
      status: output.status,
    });
  }
  info!("Dependencies installed.");
  Ok(())
}

fn print_next_steps(selection: &Selection, destination: &Path, funding: &FundingOutcome) {
  let descriptor = selection.template.descriptor();
  let run = |script: &str| selection.package_manager.run_script(script);

  println!(
    "\nSuccess! Created '{}' at {}",
    selection.project_name,
    destination.display()
  );
  println!("\nNext steps:");
  println!("  cd {}", selection.project_name);
  println!("  {}", run("move:init"));
  println!("  {}", run("move:compile"));
  println!("  {}", run("move:test"));
  println!("  {}", run("move:publish"));
  if selection.project_type == ProjectType::Fullstack {
    println!("  {}", run("dev"));
  }

  match funding {
    FundingOutcome::Failed(_) => {
      println!("\nNote: the faucet request failed. Fund the publisher account before publishing.");
    }
    FundingOutcome::SkippedMainnet => {
      println!("\nNote: on mainnet you must supply and fund your own publisher account.");
    }
    FundingOutcome::Funded => {}
  }

  println!("\nDocs: {}", descriptor.doc_url);
  if let Some(video) = descriptor.video_url {
    println!("Walkthrough: {}", video);
  }
}
