use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{ArtifactId, GraphError};
use crate::toolchain::ToolchainError;

/// Global flag lists an environment applies to every later declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlagCategory {
  /// Raw compiler switches.
  CcFlags,
  /// Include directories, relative to the project root unless absolute.
  CppPath,
  LinkFlags,
  RcFlags,
}

/// Something copied by an install action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallItem {
  /// Every output of a declared artifact.
  Artifact(ArtifactId),
  /// A plain file, relative to the project's parent directory.
  File(PathBuf),
}

/// Options for the post-link transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquabOptions {
  /// Executable name or path of the transform tool.
  pub tool: String,
  /// Extra arguments placed before the input and output paths.
  pub args: Vec<String>,
}

impl Default for SquabOptions {
  fn default() -> Self {
    Self {
      tool: crate::config::DEFAULT_SQUAB.to_string(),
      args: Vec::new(),
    }
  }
}

/// Errors raised while deriving an environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
  #[error(transparent)]
  Toolchain(#[from] ToolchainError),

  #[error("project root {0} is not a directory")]
  ProjectRoot(PathBuf),
}

/// Errors raised by a declaration. Any of them aborts graph construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeclareError {
  #[error("source file not found: {0}")]
  MissingSource(PathBuf),

  #[error("library '{name}' not found in any library directory")]
  UnresolvedLibrary { name: String },

  #[error("{0} is not a linked program")]
  NotAProgram(ArtifactId),

  #[error("project root {0} has no parent directory")]
  NoParentDirectory(PathBuf),

  #[error(transparent)]
  Graph(#[from] GraphError),
}
