use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("unknown architecture '{0}' (expected one of: x86, x64)")]
  UnknownArch(String),

  #[error("unknown toolchain version '{0}' (expected one of: vc6, vc9, vc10, vc14)")]
  UnknownVersion(String),

  #[error("unknown subsystem '{0}' (expected one of: console, windowed)")]
  UnknownSubsystem(String),

  #[error("unknown preset '{0}' (expected one of: legacy, release)")]
  UnknownPreset(String),

  #[error("unknown engine strategy '{0}' (expected one of: auto, path, module)")]
  UnknownStrategy(String),

  #[error("invalid value for {var}: {message}")]
  InvalidVar { var: String, message: String },
}

/// PE subsystem the executable is linked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
  Console,
  Windowed,
}

impl Subsystem {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Console => "console",
      Self::Windowed => "windowed",
    }
  }

  /// Value of the linker's `/SUBSYSTEM:` switch.
  pub fn link_switch(&self) -> &'static str {
    match self {
      Self::Console => "CONSOLE",
      Self::Windowed => "WINDOWS",
    }
  }
}

impl fmt::Display for Subsystem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Subsystem {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "console" => Ok(Self::Console),
      "windowed" | "windows" => Ok(Self::Windowed),
      _ => Err(ConfigError::UnknownSubsystem(s.to_string())),
    }
  }
}

/// Compiler/SDK generation of the MSVC toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainVersion {
  /// Visual C++ 6.0
  Vc6,
  /// Visual Studio 2008
  Vc9,
  /// Visual Studio 2010
  Vc10,
  /// Visual Studio 2015
  Vc14,
}

impl ToolchainVersion {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Vc6 => "vc6",
      Self::Vc9 => "vc9",
      Self::Vc10 => "vc10",
      Self::Vc14 => "vc14",
    }
  }

  /// Environment variable the Visual Studio installer sets to `Common7\Tools`.
  ///
  /// VC6 predates the convention and has no such variable.
  pub fn comntools_var(&self) -> Option<&'static str> {
    match self {
      Self::Vc6 => None,
      Self::Vc9 => Some("VS90COMNTOOLS"),
      Self::Vc10 => Some("VS100COMNTOOLS"),
      Self::Vc14 => Some("VS140COMNTOOLS"),
    }
  }

  /// Whether this generation ships an x64 compiler.
  pub fn supports(&self, arch: Arch) -> bool {
    match (self, arch) {
      (_, Arch::X86) => true,
      (Self::Vc6, Arch::X64) => false,
      (_, Arch::X64) => true,
    }
  }
}

impl fmt::Display for ToolchainVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for ToolchainVersion {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "vc6" => Ok(Self::Vc6),
      "vc9" => Ok(Self::Vc9),
      "vc10" => Ok(Self::Vc10),
      "vc14" => Ok(Self::Vc14),
      _ => Err(ConfigError::UnknownVersion(s.to_string())),
    }
  }
}

/// Target CPU architecture of the produced executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
  X86,
  X64,
}

impl Arch {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86 => "x86",
      Self::X64 => "x64",
    }
  }

  /// Value of the linker's `/MACHINE:` switch.
  pub fn machine(&self) -> &'static str {
    match self {
      Self::X86 => "X86",
      Self::X64 => "X64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Arch {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "x86" | "i386" => Ok(Self::X86),
      "x64" | "amd64" | "x86_64" => Ok(Self::X64),
      _ => Err(ConfigError::UnknownArch(s.to_string())),
    }
  }
}

/// Complete configuration of one build. Every field is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildConfig {
  pub subsystem: Subsystem,
  pub version: ToolchainVersion,
  pub arch: Arch,
}

impl BuildConfig {
  pub fn new(subsystem: Subsystem, version: ToolchainVersion, arch: Arch) -> Self {
    Self {
      subsystem,
      version,
      arch,
    }
  }
}

impl fmt::Display for BuildConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}-{}", self.version, self.arch, self.subsystem)
  }
}

/// Named configuration presets of the project.
///
/// `Legacy` compiles and links only. `Release` adds the x64 post-link
/// transform and the install step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
  Legacy,
  #[default]
  Release,
}

impl Preset {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Legacy => "legacy",
      Self::Release => "release",
    }
  }

  /// Architecture used when none is requested.
  pub fn default_arch(&self) -> Arch {
    match self {
      Self::Legacy => Arch::X86,
      Self::Release => Arch::X64,
    }
  }

  /// Pinned configuration for this preset, with the architecture supplied by the caller.
  pub fn config(&self, arch: Arch) -> BuildConfig {
    let (subsystem, version) = match self {
      Self::Legacy => (Subsystem::Console, ToolchainVersion::Vc9),
      Self::Release => (Subsystem::Console, ToolchainVersion::Vc9),
    };
    BuildConfig::new(subsystem, version, arch)
  }

  /// Whether the preset declares the post-link transform and the install step.
  pub fn installs(&self) -> bool {
    matches!(self, Self::Release)
  }
}

impl fmt::Display for Preset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Preset {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "legacy" => Ok(Self::Legacy),
      "release" => Ok(Self::Release),
      _ => Err(ConfigError::UnknownPreset(s.to_string())),
    }
  }
}
