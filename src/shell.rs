// src/shell.rs
use crate::catalog::PackageManager;

/// Host-family command rendering. One implementation per family keeps
/// env-var shell syntax out of the manifest and install code paths.
pub trait ShellCommands {
  /// The dependency-installation command for the chosen package manager.
  fn install_command(&self, package_manager: PackageManager) -> String;

  /// Renders `command` with the given environment variables set for its
  /// duration, using the family's env-var syntax.
  fn set_env_and_run(&self, vars: &[(&str, &str)], command: &str) -> String;

  /// Program and flag used to hand a command line to the system shell.
  fn shell_invocation(&self) -> (&'static str, &'static str);
}

pub struct Posix;

impl ShellCommands for Posix {
  fn install_command(&self, package_manager: PackageManager) -> String {
    format!("{} install", package_manager.command())
  }

  fn set_env_and_run(&self, vars: &[(&str, &str)], command: &str) -> String {
    let mut rendered = String::new();
    for (key, value) in vars {
      rendered.push_str(key);
      rendered.push('=');
      rendered.push_str(value);
      rendered.push(' ');
    }
    rendered.push_str(command);
    rendered
  }

  fn shell_invocation(&self) -> (&'static str, &'static str) {
    ("sh", "-c")
  }
}

pub struct Windows;

impl ShellCommands for Windows {
  fn install_command(&self, package_manager: PackageManager) -> String {
    format!("{} install", package_manager.command())
  }

  fn set_env_and_run(&self, vars: &[(&str, &str)], command: &str) -> String {
    let mut rendered = String::new();
    for (key, value) in vars {
      rendered.push_str("set ");
      rendered.push_str(key);
      rendered.push('=');
      rendered.push_str(value);
      rendered.push_str("&& ");
    }
    rendered.push_str(command);
    rendered
  }

  fn shell_invocation(&self) -> (&'static str, &'static str) {
    ("cmd", "/C")
  }
}

/// The strategy for the compile-time target.
pub fn host_shell() -> &'static dyn ShellCommands {
  if cfg!(windows) {
    &Windows
  } else {
    &Posix
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn posix_renders_inline_env_assignments() {
    let rendered = Posix.set_env_and_run(
      &[("APTOS_NETWORK", "testnet")],
      "aptos move compile --package-dir contract",
    );
    assert_eq!(
      rendered,
      "APTOS_NETWORK=testnet aptos move compile --package-dir contract"
    );
  }

  #[test]
  fn windows_renders_set_chains() {
    let rendered = Windows.set_env_and_run(
      &[("APTOS_NETWORK", "testnet"), ("FOO", "bar")],
      "aptos move compile --package-dir contract",
    );
    assert_eq!(
      rendered,
      "set APTOS_NETWORK=testnet&& set FOO=bar&& aptos move compile --package-dir contract"
    );
  }

  #[test]
  fn install_command_uses_the_chosen_manager() {
    assert_eq!(Posix.install_command(PackageManager::Pnpm), "pnpm install");
    assert_eq!(Windows.install_command(PackageManager::Yarn), "yarn install");
  }

  #[test]
  fn no_vars_renders_the_bare_command() {
    assert_eq!(Posix.set_env_and_run(&[], "aptos move test"), "aptos move test");
    assert_eq!(Windows.set_env_and_run(&[], "aptos move test"), "aptos move test");
  }
}
