//! Toolchain discovery on the build host.
//!
//! The Visual C++ root comes from an explicit directory or from the version's
//! `VS<NN>COMNTOOLS` variable (`<root>\Common7\Tools\`, two levels below the
//! install root). The Windows SDK comes from an explicit directory or
//! `WindowsSdkDir`. `INCLUDE` and `LIB`, as left behind by `vcvars*.bat`, are
//! appended to the search directories.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{Toolchain, ToolchainError, ToolchainProbe};
use crate::config::{Arch, Settings, ToolchainVersion};

const SDK_DIR_ENV: &str = "WindowsSdkDir";

#[derive(Debug, Clone, Default)]
pub struct HostProbe {
  toolchain_dir: Option<PathBuf>,
  sdk_dir: Option<PathBuf>,
}

impl HostProbe {
  /// `toolchain_dir` is the `VC` directory; `sdk_dir` the Windows SDK root.
  pub fn new(toolchain_dir: Option<PathBuf>, sdk_dir: Option<PathBuf>) -> Self {
    Self { toolchain_dir, sdk_dir }
  }

  pub fn from_settings(settings: &Settings) -> Self {
    Self::new(settings.toolchain_dir.clone(), settings.sdk_dir.clone())
  }

  fn vc_root(&self, version: ToolchainVersion, arch: Arch) -> Result<PathBuf, ToolchainError> {
    if let Some(dir) = &self.toolchain_dir {
      return Ok(dir.clone());
    }

    let not_found = |reason: String| ToolchainError::NotFound { version, arch, reason };

    let var = version
      .comntools_var()
      .ok_or_else(|| not_found(format!("{} has no COMNTOOLS variable; set the toolchain directory", version)))?;
    let tools = std::env::var_os(var).ok_or_else(|| not_found(format!("{} is not set", var)))?;

    // Common7\Tools -> install root -> VC
    let root = Path::new(&tools)
      .ancestors()
      .nth(2)
      .ok_or_else(|| not_found(format!("{} does not point into a Visual Studio install", var)))?;
    Ok(root.join("VC"))
  }

  fn sdk_root(&self) -> Option<PathBuf> {
    self
      .sdk_dir
      .clone()
      .or_else(|| std::env::var_os(SDK_DIR_ENV).map(PathBuf::from))
  }
}

impl ToolchainProbe for HostProbe {
  fn locate(&self, version: ToolchainVersion, arch: Arch) -> Result<Toolchain, ToolchainError> {
    if !version.supports(arch) {
      return Err(ToolchainError::Unsupported { version, arch });
    }

    let not_found = |reason: String| ToolchainError::NotFound { version, arch, reason };

    let vc = self.vc_root(version, arch)?;
    debug!(root = %vc.display(), %version, %arch, "probing toolchain");

    let bin_dirs: Vec<PathBuf> = match arch {
      Arch::X86 => vec![vc.join("bin")],
      // Native x64 compiler first, then the x86-hosted cross compiler.
      Arch::X64 => vec![vc.join("bin").join("amd64"), vc.join("bin").join("x86_amd64")],
    };
    let bin = bin_dirs
      .iter()
      .find(|dir| dir.join("cl.exe").is_file())
      .ok_or_else(|| not_found(format!("cl.exe not found under {}", vc.join("bin").display())))?;

    let compiler = bin.join("cl.exe");
    let linker = [bin.clone(), vc.join("bin")]
      .iter()
      .map(|dir| dir.join("link.exe"))
      .find(|p| p.is_file())
      .ok_or_else(|| not_found(format!("link.exe not found in {}", bin.display())))?;

    let sdk = self.sdk_root();

    let mut rc_candidates = Vec::new();
    if let Some(sdk) = &sdk {
      if arch == Arch::X64 {
        rc_candidates.push(sdk.join("Bin").join("x64").join("rc.exe"));
      }
      rc_candidates.push(sdk.join("Bin").join("rc.exe"));
    }
    rc_candidates.push(bin.join("rc.exe"));
    rc_candidates.push(vc.join("bin").join("rc.exe"));
    let resource_compiler = rc_candidates
      .into_iter()
      .find(|p| p.is_file())
      .ok_or_else(|| not_found("rc.exe not found in the SDK or toolchain bin directories".to_string()))?;

    let mut include_dirs = vec![vc.join("include")];
    let mut lib_dirs = match arch {
      Arch::X86 => vec![vc.join("lib")],
      Arch::X64 => vec![vc.join("lib").join("amd64")],
    };
    if let Some(sdk) = &sdk {
      include_dirs.push(sdk.join("Include"));
      lib_dirs.push(match arch {
        Arch::X86 => sdk.join("Lib"),
        Arch::X64 => sdk.join("Lib").join("x64"),
      });
    }
    include_dirs.extend(env_dirs("INCLUDE"));
    lib_dirs.extend(env_dirs("LIB"));
    include_dirs.retain(|d| d.is_dir());
    lib_dirs.retain(|d| d.is_dir());
    include_dirs.dedup();
    lib_dirs.dedup();

    info!(compiler = %compiler.display(), %version, %arch, "located toolchain");

    Ok(Toolchain {
      version,
      arch,
      compiler,
      linker,
      resource_compiler,
      include_dirs,
      lib_dirs,
    })
  }
}

fn env_dirs(name: &str) -> Vec<PathBuf> {
  std::env::var_os(name)
    .map(|v| std::env::split_paths(&v).filter(|p| !p.as_os_str().is_empty()).collect())
    .unwrap_or_default()
}
