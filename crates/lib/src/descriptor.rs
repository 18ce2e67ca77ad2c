//! The tatdylf build description.
//!
//! [`describe`] turns the settings into a complete artifact graph: two
//! translation units and a resource script compiled into `build/`, linked
//! against the system import libraries, optionally transformed for x64, and
//! installed next to `tatdylf.ini` in `<parent>/bin`. The description is
//! all-or-nothing: any failing step returns an error and no graph.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::Error;
use crate::config::{Arch, BuildConfig, Preset, Settings};
use crate::consts::{
  BUILD_DIR, DEFINITION_FILE, INSTALL_DIR, PROGRAM_NAME, RESOURCE_SCRIPT, SIBLING_CONFIG, SOURCES, SRC_DIR,
  SYSTEM_LIBS,
};
use crate::env::{DeclareError, FlagCategory, InstallItem, MsvcEnvironment, SquabOptions};
use crate::graph::{ArtifactId, BuildGraph};
use crate::toolchain::ToolchainProbe;

/// A fully described project.
#[derive(Debug)]
pub struct Project {
  pub preset: Preset,
  pub config: BuildConfig,
  pub root: PathBuf,
  pub graph: BuildGraph,
  /// The raw linked executable.
  pub program: ArtifactId,
  /// The artifact built when the engine is given no target.
  pub default_target: ArtifactId,
  pub install: Option<ArtifactId>,
}

impl Project {
  /// Where the rendered definition is written for the engine.
  pub fn definition_path(&self) -> PathBuf {
    self.root.join(BUILD_DIR).join(DEFINITION_FILE)
  }
}

/// How the default target is chosen from the linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
  /// The linked program itself.
  Plain,
  /// The program after the post-link transform.
  TransformThenSelect(SquabOptions),
}

impl TargetSelection {
  pub fn for_arch(arch: Arch, squab: SquabOptions) -> Self {
    match arch {
      Arch::X86 => Self::Plain,
      Arch::X64 => Self::TransformThenSelect(squab),
    }
  }

  /// Presets without the transform always select the plain program.
  pub fn for_preset(preset: Preset, arch: Arch, squab: SquabOptions) -> Self {
    match preset {
      Preset::Legacy => Self::Plain,
      Preset::Release => Self::for_arch(arch, squab),
    }
  }

  /// Register the default target and return it.
  pub fn apply(&self, env: &mut MsvcEnvironment, program: ArtifactId) -> Result<ArtifactId, DeclareError> {
    match self {
      Self::Plain => select_plain(env, program),
      Self::TransformThenSelect(options) => select_transformed(env, program, options),
    }
  }
}

pub fn select_plain(env: &mut MsvcEnvironment, program: ArtifactId) -> Result<ArtifactId, DeclareError> {
  env.default(program)?;
  Ok(program)
}

pub fn select_transformed(
  env: &mut MsvcEnvironment,
  program: ArtifactId,
  options: &SquabOptions,
) -> Result<ArtifactId, DeclareError> {
  let transformed = env.squab(options, program)?;
  env.default(transformed)?;
  Ok(transformed)
}

/// Describe the project for the configured preset and architecture.
pub fn describe(settings: &Settings, probe: &dyn ToolchainProbe) -> Result<Project, Error> {
  let squab = SquabOptions {
    tool: settings.squab.clone(),
    ..SquabOptions::default()
  };
  describe_preset(settings.preset, settings.arch, probe, &settings.project_root, squab)
}

pub fn describe_preset(
  preset: Preset,
  arch: Arch,
  probe: &dyn ToolchainProbe,
  root: &Path,
  squab: SquabOptions,
) -> Result<Project, Error> {
  let config = preset.config(arch);
  let mut env = MsvcEnvironment::new(config, probe, root)?;

  env.set_build_dir(SRC_DIR, BUILD_DIR);
  match preset {
    Preset::Legacy => env.append(FlagCategory::CcFlags, [format!("/I{}", SRC_DIR)]),
    Preset::Release => env.append(FlagCategory::CppPath, [SRC_DIR]),
  }

  let mut inputs = env.object(SOURCES)?;
  inputs.push(env.res(RESOURCE_SCRIPT)?);
  let program = env.program(PROGRAM_NAME, &inputs, &SYSTEM_LIBS)?;

  let default_target = TargetSelection::for_preset(preset, arch, squab).apply(&mut env, program)?;

  let install = if preset.installs() {
    Some(env.install_relative_to_parent_dir(
      INSTALL_DIR,
      &[
        InstallItem::Artifact(default_target),
        InstallItem::File(PathBuf::from(SIBLING_CONFIG)),
      ],
    )?)
  } else {
    None
  };

  let graph = env.finish();
  info!(%preset, %config, artifacts = graph.len(), "described project");

  Ok(Project {
    preset,
    config,
    root: root.to_path_buf(),
    graph,
    program,
    default_target,
    install,
  })
}
