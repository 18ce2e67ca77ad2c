//! MSVC toolchain abstraction.
//!
//! A [`ToolchainProbe`] turns a (version, architecture) pair into a concrete
//! [`Toolchain`]: the compiler, linker and resource compiler to invoke, and the
//! directories searched for headers and import libraries. Discovery on a real
//! host lives in [`host`].

mod host;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Arch, ToolchainVersion};

pub use host::HostProbe;

/// Errors raised while locating a toolchain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolchainError {
  /// The generation has no compiler for the requested architecture.
  #[error("unsupported toolchain combination: {version} cannot target {arch}")]
  Unsupported { version: ToolchainVersion, arch: Arch },

  /// The combination is valid but is not installed on this host.
  #[error("toolchain {version}/{arch} not found: {reason}")]
  NotFound {
    version: ToolchainVersion,
    arch: Arch,
    reason: String,
  },
}

/// A located toolchain for one version and architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
  pub version: ToolchainVersion,
  pub arch: Arch,
  pub compiler: PathBuf,
  pub linker: PathBuf,
  pub resource_compiler: PathBuf,
  pub include_dirs: Vec<PathBuf>,
  pub lib_dirs: Vec<PathBuf>,
}

impl Toolchain {
  /// Find an import library in the toolchain's library directories.
  ///
  /// A bare name without extension gets `.lib` appended. File names are
  /// compared case-insensitively, as the Windows linker does.
  pub fn resolve_library(&self, name: &str) -> Option<PathBuf> {
    let file_name = if Path::new(name).extension().is_some() {
      name.to_string()
    } else {
      format!("{}.lib", name)
    };

    let direct = Path::new(&file_name);
    if direct.is_absolute() {
      return direct.is_file().then(|| direct.to_path_buf());
    }

    self
      .lib_dirs
      .iter()
      .find_map(|dir| find_case_insensitive(dir, &file_name))
  }
}

fn find_case_insensitive(dir: &Path, file_name: &str) -> Option<PathBuf> {
  let exact = dir.join(file_name);
  if exact.is_file() {
    return Some(exact);
  }

  std::fs::read_dir(dir).ok()?.flatten().find_map(|entry| {
    let name = entry.file_name();
    let matches = name.to_str().is_some_and(|n| n.eq_ignore_ascii_case(file_name));
    (matches && entry.path().is_file()).then(|| entry.path())
  })
}

/// Locates a toolchain for a configuration.
pub trait ToolchainProbe {
  fn locate(&self, version: ToolchainVersion, arch: Arch) -> Result<Toolchain, ToolchainError>;
}
