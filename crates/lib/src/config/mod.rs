//! Build configuration: the enums that pin a build, named presets, and the
//! environment-driven settings layer.

mod settings;
mod types;

pub use settings::*;
pub use types::{Arch, BuildConfig, ConfigError, Preset, Subsystem, ToolchainVersion};
