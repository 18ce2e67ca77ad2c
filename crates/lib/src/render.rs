//! Rendering a described project into a definition the engine reads.
//!
//! The SCons rendering uses only core SCons calls with fully resolved command
//! lines, so the engine needs no toolchain knowledge of its own. The first
//! line carries the graph hash.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::Error;
use crate::config::{BuildConfig, Preset};
use crate::consts::DEFINITION_HEADER;
use crate::descriptor::Project;
use crate::graph::{Action, ArtifactId, GraphManifest};
use crate::util::hash::{GraphHash, Hashable};

/// A rendered definition and the hash of the graph it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
  pub hash: GraphHash,
  pub contents: String,
}

#[derive(Serialize)]
struct JsonDefinition<'a> {
  hash: &'a GraphHash,
  preset: Preset,
  config: BuildConfig,
  waves: Vec<Vec<ArtifactId>>,
  graph: &'a GraphManifest,
}

fn var(id: ArtifactId) -> String {
  format!("a{}", id.index())
}

/// Python string literal. Control characters use Python's escapes.
fn py_str(s: &str) -> String {
  let mut out = String::with_capacity(s.len() + 2);
  out.push('\'');
  for c in s.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\'' => out.push_str("\\'"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      c if c.is_control() => {
        let _ = write!(out, "\\u{:04x}", c as u32);
      }
      c => out.push(c),
    }
  }
  out.push('\'');
  out
}

fn py_path(p: &Path) -> String {
  py_str(&p.to_string_lossy())
}

fn py_list<I: IntoIterator<Item = String>>(items: I) -> String {
  format!("[{}]", items.into_iter().collect::<Vec<_>>().join(", "))
}

pub fn render_scons(project: &Project) -> Result<Definition, Error> {
  let manifest = project.graph.to_manifest();
  let hash = manifest.compute_hash()?;
  let mut out = String::new();

  // Writing to a String cannot fail.
  let _ = writeln!(out, "{}{}", DEFINITION_HEADER, hash);
  let _ = writeln!(
    out,
    "# tatdylf build graph: preset {}, {}. Regenerated by bld; edits are lost.",
    project.preset, project.config
  );
  let _ = writeln!(out, "import os");
  let _ = writeln!(out);
  // `Install` is provided by the install tool; `Command` needs none.
  let _ = writeln!(out, "env = Environment(ENV=os.environ, tools=['install'])");
  let _ = writeln!(out);

  for entry in &manifest.artifacts {
    let artifact = &entry.artifact;
    let sources = std::iter::once(py_list(artifact.sources.iter().map(|p| py_path(p))))
      .chain(entry.inputs.iter().map(|id| var(*id)))
      .collect::<Vec<_>>()
      .join(" + ");

    let _ = writeln!(out, "# {} {}", artifact.kind.as_str(), artifact.name);
    match &artifact.action {
      Action::Run(invocation) => {
        // SCons expands `$` in actions.
        let command = invocation.command_line().replace('$', "$$");
        let _ = writeln!(
          out,
          "{} = env.Command({}, {}, {})",
          var(entry.id),
          py_list(artifact.outputs.iter().map(|p| py_path(p))),
          sources,
          py_str(&command)
        );
      }
      Action::Copy { files } => {
        let dest = files
          .first()
          .and_then(|f| f.to.parent())
          .map(py_path)
          .unwrap_or_else(|| py_str("."));
        let _ = writeln!(out, "{} = env.Install({}, {})", var(entry.id), dest, sources);
        let _ = writeln!(out, "env.Alias('install', {})", var(entry.id));
      }
    }
  }

  if let Some(default) = manifest.default {
    let _ = writeln!(out);
    let _ = writeln!(out, "Default({})", var(default));
  }

  debug!(%hash, lines = out.lines().count(), "rendered SCons definition");
  Ok(Definition { hash, contents: out })
}

pub fn render_json(project: &Project) -> Result<Definition, Error> {
  let manifest = project.graph.to_manifest();
  let hash = manifest.compute_hash()?;
  let waves = project.graph.waves()?;

  let contents = serde_json::to_string_pretty(&JsonDefinition {
    hash: &hash,
    preset: project.preset,
    config: project.config,
    waves,
    graph: &manifest,
  })?;

  Ok(Definition { hash, contents })
}

/// Write `definition` to `path` unless the file already holds the same graph.
///
/// Returns whether the file was written.
pub fn write_definition(path: &Path, definition: &Definition) -> Result<bool, Error> {
  let header = format!("{}{}", DEFINITION_HEADER, definition.hash);
  if let Ok(existing) = std::fs::read_to_string(path)
    && existing.lines().next() == Some(header.as_str())
  {
    debug!(path = %path.display(), "definition unchanged");
    return Ok(false);
  }

  let write_err = |source| Error::Write {
    path: path.to_path_buf(),
    source,
  };
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).map_err(write_err)?;
  }
  std::fs::write(path, &definition.contents).map_err(write_err)?;
  debug!(path = %path.display(), "wrote definition");
  Ok(true)
}
