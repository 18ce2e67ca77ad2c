//! tatdylf-build-lib: build description and engine launcher for tatdylf.
//!
//! - [`config`]: the enums that pin a build, presets, and `TATDYLF_*` settings
//! - [`toolchain`]: locating the MSVC compiler, linker and libraries
//! - [`env`]: the declaration builder that records artifacts and commands
//! - [`graph`]: the artifact dependency graph
//! - [`descriptor`]: the tatdylf project itself
//! - [`render`]: the definition file handed to the engine
//! - [`launcher`]: resolving and running the engine

pub mod config;
pub mod consts;
pub mod descriptor;
pub mod env;
mod error;
pub mod graph;
pub mod launcher;
pub mod render;
pub mod toolchain;
pub mod util;

pub use error::{Error, Result};
