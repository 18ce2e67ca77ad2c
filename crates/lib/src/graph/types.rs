use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque handle to an artifact declared in a [`BuildGraph`](super::BuildGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactId(pub(crate) usize);

impl ArtifactId {
  pub fn index(&self) -> usize {
    self.0
  }
}

impl fmt::Display for ArtifactId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "artifact#{}", self.0)
  }
}

/// Errors raised while assembling the artifact graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
  #[error("unknown artifact: {0}")]
  UnknownArtifact(ArtifactId),

  #[error("dependency cycle detected")]
  CycleDetected,

  #[error("default target already registered ({existing}); refusing to register {requested}")]
  DefaultAlreadySet {
    existing: ArtifactId,
    requested: ArtifactId,
  },
}

/// What an artifact is. Program artifacts carry their import libraries in link order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactKind {
  Object,
  Resource,
  Program { libs: Vec<String> },
  Transformed,
  Install { dest: PathBuf },
}

impl ArtifactKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Object => "object",
      Self::Resource => "resource",
      Self::Program { .. } => "program",
      Self::Transformed => "transformed",
      Self::Install { .. } => "install",
    }
  }
}

/// A concrete tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Invocation {
  pub program: PathBuf,
  pub args: Vec<String>,
}

impl Invocation {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Command line as a Windows shell would receive it; arguments containing
  /// spaces are double-quoted.
  pub fn command_line(&self) -> String {
    std::iter::once(self.program.to_string_lossy().into_owned())
      .chain(self.args.iter().cloned())
      .map(|a| quote(&a))
      .collect::<Vec<_>>()
      .join(" ")
  }
}

fn quote(arg: &str) -> String {
  if arg.is_empty() || arg.contains([' ', '\t']) {
    format!("\"{}\"", arg)
  } else {
    arg.to_string()
  }
}

/// One file copy performed by an install action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileCopy {
  pub from: PathBuf,
  pub to: PathBuf,
}

/// The work the engine performs to produce an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
  Run(Invocation),
  Copy { files: Vec<FileCopy> },
}

/// A declared build output.
///
/// `sources` lists the plain files the action reads; inputs produced by other
/// artifacts are edges in the graph instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
  pub name: String,
  pub kind: ArtifactKind,
  pub outputs: Vec<PathBuf>,
  pub sources: Vec<PathBuf>,
  pub action: Action,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn command_line_quotes_spaces() {
    let inv = Invocation::new("C:/Program Files/VC/bin/cl.exe")
      .arg("/nologo")
      .arg("/FoC:/my build/a.obj");
    assert_eq!(
      inv.command_line(),
      "\"C:/Program Files/VC/bin/cl.exe\" /nologo \"/FoC:/my build/a.obj\""
    );
  }

  #[test]
  fn kind_serializes_with_type_tag() {
    let kind = ArtifactKind::Program {
      libs: vec!["kernel32.lib".to_string()],
    };
    let json = serde_json::to_value(&kind).unwrap();
    assert_eq!(json["type"], "program");
    assert_eq!(json["libs"][0], "kernel32.lib");
  }
}
