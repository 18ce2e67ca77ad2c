//! The artifact graph produced by a build description.

mod dag;
mod types;

pub use dag::{BuildGraph, GraphManifest, ManifestEntry};
pub use types::*;
