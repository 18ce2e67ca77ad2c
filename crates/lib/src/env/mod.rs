//! Build environment for the MSVC toolchain family.
//!
//! A [`MsvcEnvironment`] is derived from one [`BuildConfig`] and owns the
//! artifact graph while it is being described. Each declaration validates its
//! inputs against the filesystem and the located toolchain, records the
//! concrete command the engine must run, and returns the new artifact's
//! handle. [`MsvcEnvironment::finish`] hands the graph over.

mod types;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::graph::{Action, Artifact, ArtifactId, ArtifactKind, BuildGraph, FileCopy, GraphError, Invocation};
use crate::toolchain::{Toolchain, ToolchainProbe};

pub use types::*;

#[derive(Debug)]
pub struct MsvcEnvironment {
  config: BuildConfig,
  toolchain: Toolchain,
  root: PathBuf,
  /// (source subtree, build subtree), both relative to `root`.
  build_dirs: Vec<(PathBuf, PathBuf)>,
  flags: BTreeMap<FlagCategory, Vec<String>>,
  graph: BuildGraph,
}

impl MsvcEnvironment {
  /// Derive an environment, locating the toolchain for `config` through `probe`.
  pub fn new(
    config: BuildConfig,
    probe: &dyn ToolchainProbe,
    root: impl Into<PathBuf>,
  ) -> Result<Self, EnvError> {
    let root = root.into();
    if !root.is_dir() {
      return Err(EnvError::ProjectRoot(root));
    }

    let toolchain = probe.locate(config.version, config.arch)?;
    info!(%config, root = %root.display(), "derived build environment");

    Ok(Self {
      config,
      toolchain,
      root,
      build_dirs: Vec::new(),
      flags: BTreeMap::new(),
      graph: BuildGraph::new(),
    })
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  pub fn toolchain(&self) -> &Toolchain {
    &self.toolchain
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn graph(&self) -> &BuildGraph {
    &self.graph
  }

  pub fn flags(&self, category: FlagCategory) -> &[String] {
    self.flags.get(&category).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Compile sources found under `src` into `build`. Applies to every later declaration.
  pub fn set_build_dir(&mut self, src: impl Into<PathBuf>, build: impl Into<PathBuf>) {
    let (src, build) = (src.into(), build.into());
    debug!(src = %src.display(), build = %build.display(), "mapped build directory");
    self.build_dirs.push((src, build));
  }

  pub fn append<I, S>(&mut self, category: FlagCategory, values: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self
      .flags
      .entry(category)
      .or_default()
      .extend(values.into_iter().map(Into::into));
  }

  /// Resolve a source name to its path and the directory its outputs go to.
  fn locate_source(&self, name: &str) -> Result<(PathBuf, PathBuf), DeclareError> {
    let name = Path::new(name);
    let sub = name.parent().unwrap_or(Path::new(""));

    let candidates: Vec<(PathBuf, PathBuf)> = if self.build_dirs.is_empty() {
      vec![(self.root.join(name), self.root.join(sub))]
    } else {
      self
        .build_dirs
        .iter()
        .map(|(src, build)| (self.root.join(src).join(name), self.root.join(build).join(sub)))
        .collect()
    };

    candidates
      .iter()
      .find(|(path, _)| path.is_file())
      .cloned()
      .ok_or_else(|| DeclareError::MissingSource(candidates[0].0.clone()))
  }

  /// Where linked and transformed outputs go: the first build subtree, or the root.
  fn output_dir(&self) -> PathBuf {
    match self.build_dirs.first() {
      Some((_, build)) => self.root.join(build),
      None => self.root.clone(),
    }
  }

  fn include_args(&self) -> Vec<String> {
    self
      .flags(FlagCategory::CppPath)
      .iter()
      .map(|dir| self.root.join(dir))
      .chain(self.toolchain.include_dirs.iter().cloned())
      .map(|dir| format!("/I{}", dir.display()))
      .collect()
  }

  /// Declare one object artifact per source. The objects do not depend on each other.
  pub fn object<I, S>(&mut self, sources: I) -> Result<Vec<ArtifactId>, DeclareError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let located = sources
      .into_iter()
      .map(|s| self.locate_source(s.as_ref()))
      .collect::<Result<Vec<_>, _>>()?;

    let includes = self.include_args();
    let mut ids = Vec::with_capacity(located.len());

    for (source, out_dir) in located {
      let obj = out_dir.join(file_with_extension(&source, "obj"));
      let invocation = Invocation::new(&self.toolchain.compiler)
        .args(["/nologo", "/c", "/EHsc"])
        .args(self.flags(FlagCategory::CcFlags).iter().cloned())
        .args(includes.iter().cloned())
        .arg(format!("/Fo{}", obj.display()))
        .arg(source.display().to_string());

      let id = self.graph.add(Artifact {
        name: file_name(&obj),
        kind: ArtifactKind::Object,
        outputs: vec![obj],
        sources: vec![source],
        action: Action::Run(invocation),
      });
      debug!(%id, "declared object");
      ids.push(id);
    }

    Ok(ids)
  }

  /// Declare a compiled resource from a resource script.
  pub fn res(&mut self, script: &str) -> Result<ArtifactId, DeclareError> {
    let (source, out_dir) = self.locate_source(script)?;
    let res = out_dir.join(file_with_extension(&source, "res"));

    let invocation = Invocation::new(&self.toolchain.resource_compiler)
      .arg("/nologo")
      .args(self.flags(FlagCategory::RcFlags).iter().cloned())
      .args(self.include_args())
      .arg(format!("/fo{}", res.display()))
      .arg(source.display().to_string());

    let id = self.graph.add(Artifact {
      name: file_name(&res),
      kind: ArtifactKind::Resource,
      outputs: vec![res],
      sources: vec![source],
      action: Action::Run(invocation),
    });
    debug!(%id, "declared resource");
    Ok(id)
  }

  /// Declare the linked executable. `libs` reach the linker in the given order.
  pub fn program<S: AsRef<str>>(
    &mut self,
    name: &str,
    inputs: &[ArtifactId],
    libs: &[S],
  ) -> Result<ArtifactId, DeclareError> {
    let mut input_files = Vec::new();
    for &input in inputs {
      let artifact = self
        .graph
        .artifact(input)
        .ok_or(GraphError::UnknownArtifact(input))?;
      input_files.extend(artifact.outputs.iter().map(|p| p.display().to_string()));
    }

    let libs: Vec<String> = libs.iter().map(|l| l.as_ref().to_string()).collect();
    for lib in &libs {
      if self.toolchain.resolve_library(lib).is_none() {
        return Err(DeclareError::UnresolvedLibrary { name: lib.clone() });
      }
    }

    let exe = self.output_dir().join(name);
    let invocation = Invocation::new(&self.toolchain.linker)
      .args([
        "/nologo".to_string(),
        format!("/SUBSYSTEM:{}", self.config.subsystem.link_switch()),
        format!("/MACHINE:{}", self.config.arch.machine()),
      ])
      .args(self.flags(FlagCategory::LinkFlags).iter().cloned())
      .args(self.toolchain.lib_dirs.iter().map(|d| format!("/LIBPATH:{}", d.display())))
      .arg(format!("/OUT:{}", exe.display()))
      .args(input_files)
      .args(libs.iter().cloned());

    let id = self.graph.add(Artifact {
      name: name.to_string(),
      kind: ArtifactKind::Program { libs },
      outputs: vec![exe],
      sources: Vec::new(),
      action: Action::Run(invocation),
    });
    for &input in inputs {
      self.graph.depend(input, id)?;
    }

    info!(%id, name, inputs = inputs.len(), "declared program");
    Ok(id)
  }

  /// Declare the post-link transform of a linked program.
  pub fn squab(&mut self, options: &SquabOptions, program: ArtifactId) -> Result<ArtifactId, DeclareError> {
    let artifact = self
      .graph
      .artifact(program)
      .ok_or(GraphError::UnknownArtifact(program))?;
    let (ArtifactKind::Program { .. }, Some(input)) = (&artifact.kind, artifact.outputs.first()) else {
      return Err(DeclareError::NotAProgram(program));
    };

    let input = input.clone();
    let name = artifact.name.clone();
    let output = self.output_dir().join(crate::consts::TRANSFORM_DIR).join(&name);

    let invocation = Invocation::new(&options.tool)
      .args(options.args.iter().cloned())
      .arg(input.display().to_string())
      .arg(output.display().to_string());

    let id = self.graph.add(Artifact {
      name,
      kind: ArtifactKind::Transformed,
      outputs: vec![output],
      sources: Vec::new(),
      action: Action::Run(invocation),
    });
    self.graph.depend(program, id)?;

    info!(%id, input = %program, "declared post-link transform");
    Ok(id)
  }

  /// Register the artifact built when the engine is given no target.
  pub fn default(&mut self, id: ArtifactId) -> Result<(), DeclareError> {
    self.graph.set_default(id)?;
    info!(%id, "registered default target");
    Ok(())
  }

  /// Declare copies of `items` into `<parent of root>/<dest>`.
  pub fn install_relative_to_parent_dir(
    &mut self,
    dest: &str,
    items: &[InstallItem],
  ) -> Result<ArtifactId, DeclareError> {
    let parent = self
      .root
      .parent()
      .ok_or_else(|| DeclareError::NoParentDirectory(self.root.clone()))?
      .to_path_buf();
    let dest_dir = parent.join(dest);

    let mut files = Vec::new();
    let mut sources = Vec::new();
    let mut inputs = Vec::new();

    for item in items {
      match item {
        InstallItem::Artifact(id) => {
          let artifact = self
            .graph
            .artifact(*id)
            .ok_or(GraphError::UnknownArtifact(*id))?;
          for output in &artifact.outputs {
            files.push(FileCopy {
              from: output.clone(),
              to: dest_dir.join(file_name(output)),
            });
          }
          inputs.push(*id);
        }
        InstallItem::File(relative) => {
          let path = parent.join(relative);
          if !path.is_file() {
            return Err(DeclareError::MissingSource(path));
          }
          files.push(FileCopy {
            from: path.clone(),
            to: dest_dir.join(file_name(&path)),
          });
          sources.push(path);
        }
      }
    }

    let id = self.graph.add(Artifact {
      name: format!("install-{}", dest),
      kind: ArtifactKind::Install { dest: dest_dir.clone() },
      outputs: files.iter().map(|f| f.to.clone()).collect(),
      sources,
      action: Action::Copy { files },
    });
    for input in inputs {
      self.graph.depend(input, id)?;
    }

    info!(%id, dest = %dest_dir.display(), "declared install");
    Ok(id)
  }

  /// Consume the environment and return the described graph.
  pub fn finish(self) -> BuildGraph {
    self.graph
  }
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default()
}

fn file_with_extension(path: &Path, ext: &str) -> PathBuf {
  PathBuf::from(file_name(path)).with_extension(ext)
}
