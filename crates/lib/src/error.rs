use thiserror::Error;

use crate::config::ConfigError;
use crate::env::{DeclareError, EnvError};
use crate::graph::GraphError;
use crate::launcher::LaunchError;

/// Any failure of the build description or the launcher. All are terminal.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Env(#[from] EnvError),

  #[error(transparent)]
  Declare(#[from] DeclareError),

  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Launch(#[from] LaunchError),

  #[error("failed to serialize build graph: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("failed to write {path}: {source}")]
  Write {
    path: std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
