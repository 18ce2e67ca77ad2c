//! Settings read from the process environment.
//!
//! Every knob has a `TATDYLF_*` variable; unset or empty variables fall back to
//! the defaults below. Values are validated here so that a bad setting fails
//! before any artifact is declared.

use std::path::PathBuf;

use tracing::debug;

use super::types::{Arch, ConfigError, Preset};
use crate::launcher::EngineStrategy;

pub const PRESET_VAR: &str = "TATDYLF_PRESET";
pub const ARCH_VAR: &str = "TATDYLF_ARCH";
pub const PROJECT_ROOT_VAR: &str = "TATDYLF_PROJECT_ROOT";
pub const PYTHON_VAR: &str = "TATDYLF_PYTHON";
pub const ENGINE_VAR: &str = "TATDYLF_ENGINE";
pub const ENGINE_STRATEGY_VAR: &str = "TATDYLF_ENGINE_STRATEGY";
pub const TOOLCHAIN_DIR_VAR: &str = "TATDYLF_TOOLCHAIN_DIR";
pub const SDK_DIR_VAR: &str = "TATDYLF_SDK_DIR";
pub const SQUAB_VAR: &str = "TATDYLF_SQUAB";

/// Default name of the post-link transform tool.
pub const DEFAULT_SQUAB: &str = "squab";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub preset: Preset,
  pub arch: Arch,
  /// Set when the architecture was chosen explicitly rather than taken from the preset.
  pub arch_pinned: bool,
  pub project_root: PathBuf,
  /// Interpreter that runs the engine; looked up on `PATH` when unset.
  pub interpreter: Option<PathBuf>,
  /// Engine entry point; looked up on `PATH` when unset.
  pub engine: Option<PathBuf>,
  pub strategy: EngineStrategy,
  pub toolchain_dir: Option<PathBuf>,
  pub sdk_dir: Option<PathBuf>,
  pub squab: String,
}

impl Settings {
  /// Read all settings from `TATDYLF_*` environment variables.
  pub fn from_env() -> Result<Self, ConfigError> {
    let preset = match var(PRESET_VAR) {
      Some(v) => v.parse()?,
      None => Preset::default(),
    };
    let (arch, arch_pinned) = match var(ARCH_VAR) {
      Some(v) => (v.parse()?, true),
      None => (preset.default_arch(), false),
    };
    let strategy = match var(ENGINE_STRATEGY_VAR) {
      Some(v) => v.parse()?,
      None => EngineStrategy::default(),
    };

    let project_root = match var(PROJECT_ROOT_VAR) {
      Some(v) => PathBuf::from(v),
      None => std::env::current_dir().map_err(|e| ConfigError::InvalidVar {
        var: PROJECT_ROOT_VAR.to_string(),
        message: format!("cannot read current directory: {}", e),
      })?,
    };
    let project_root = dunce::canonicalize(&project_root).map_err(|e| ConfigError::InvalidVar {
      var: PROJECT_ROOT_VAR.to_string(),
      message: format!("{}: {}", project_root.display(), e),
    })?;

    let settings = Self {
      preset,
      arch,
      arch_pinned,
      project_root,
      interpreter: var(PYTHON_VAR).map(PathBuf::from),
      engine: var(ENGINE_VAR).map(PathBuf::from),
      strategy,
      toolchain_dir: var(TOOLCHAIN_DIR_VAR).map(PathBuf::from),
      sdk_dir: var(SDK_DIR_VAR).map(PathBuf::from),
      squab: var(SQUAB_VAR).unwrap_or_else(|| DEFAULT_SQUAB.to_string()),
    };

    debug!(preset = %settings.preset, arch = %settings.arch, root = %settings.project_root.display(), "loaded settings");
    Ok(settings)
  }

  /// Replace the preset; the architecture follows the new preset's default
  /// unless it was pinned by `TATDYLF_ARCH` or [`Settings::with_arch`].
  pub fn with_preset(mut self, preset: Preset) -> Self {
    if !self.arch_pinned {
      self.arch = preset.default_arch();
    }
    self.preset = preset;
    self
  }

  pub fn with_arch(mut self, arch: Arch) -> Self {
    self.arch = arch;
    self.arch_pinned = true;
    self
  }
}

fn var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.is_empty())
}
