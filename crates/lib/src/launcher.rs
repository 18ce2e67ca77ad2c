//! Bootstrap launcher: hands the rendered definition to the build engine.
//!
//! The engine (SCons) is a Python program. It is found either as a `scons`
//! script on `PATH` or as the `SCons` module of the interpreter, and is run as
//! `[interpreter, entry..., "-f", definition, forwarded...]`. The launcher
//! waits for it without a timeout and reports its exit code unchanged.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

use crate::Error as CrateError;
use crate::config::{ConfigError, Settings};
use crate::descriptor;
use crate::render::{render_scons, write_definition};
use crate::toolchain::ToolchainProbe;

/// Name of the engine script looked up on `PATH`.
pub const ENGINE_NAME: &str = "scons";

/// Module run with `-m` when the engine is not on `PATH`.
pub const ENGINE_MODULE: &str = "SCons";

/// Interpreter names tried on `PATH`, in order.
pub const INTERPRETERS: [&str; 2] = ["python3", "python"];

/// How the engine entry point is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineStrategy {
  /// `PATH` first, then the interpreter's module.
  #[default]
  Auto,
  SearchPath,
  Module,
}

impl EngineStrategy {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Auto => "auto",
      Self::SearchPath => "path",
      Self::Module => "module",
    }
  }
}

impl fmt::Display for EngineStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for EngineStrategy {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "auto" => Ok(Self::Auto),
      "path" => Ok(Self::SearchPath),
      "module" => Ok(Self::Module),
      _ => Err(ConfigError::UnknownStrategy(s.to_string())),
    }
  }
}

#[derive(Debug, Error)]
pub enum LaunchError {
  #[error("no interpreter found: {0}")]
  InterpreterNotFound(String),

  #[error("build engine not found: {0}")]
  EngineNotFound(String),

  #[error("failed to start {program}: {source}")]
  Spawn {
    program: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// A resolved engine: the interpreter and the arguments that select the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
  pub interpreter: PathBuf,
  pub entry: Vec<OsString>,
}

impl EngineCommand {
  /// The full argument vector, program first.
  pub fn argv(&self, definition: &Path, forwarded: &[OsString]) -> Vec<OsString> {
    let mut argv = Vec::with_capacity(forwarded.len() + self.entry.len() + 3);
    argv.push(self.interpreter.clone().into_os_string());
    argv.extend(self.entry.iter().cloned());
    argv.push("-f".into());
    argv.push(definition.as_os_str().to_os_string());
    argv.extend(forwarded.iter().cloned());
    argv
  }
}

/// Find a program: explicit paths must exist, bare names are looked up on `PATH`.
fn find_program(name: &Path) -> Option<PathBuf> {
  if name.components().count() > 1 || name.is_absolute() {
    return name.is_file().then(|| name.to_path_buf());
  }
  which::which(name).ok()
}

fn resolve_interpreter(explicit: Option<&Path>) -> Result<PathBuf, LaunchError> {
  if let Some(path) = explicit {
    return find_program(path)
      .ok_or_else(|| LaunchError::InterpreterNotFound(format!("{} does not exist", path.display())));
  }

  INTERPRETERS
    .iter()
    .find_map(|name| find_program(Path::new(name)))
    .ok_or_else(|| LaunchError::InterpreterNotFound(format!("none of {} on PATH", INTERPRETERS.join(", "))))
}

fn engine_on_path(explicit: Option<&Path>) -> Option<PathBuf> {
  find_program(explicit.unwrap_or(Path::new(ENGINE_NAME)))
}

fn module_available(interpreter: &Path) -> bool {
  Command::new(interpreter)
    .args(["-c", &format!("import {}", ENGINE_MODULE)])
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .status()
    .is_ok_and(|s| s.success())
}

/// Resolve the interpreter and engine entry point. Fails without spawning the engine.
pub fn resolve_engine(settings: &Settings) -> Result<EngineCommand, LaunchError> {
  let interpreter = resolve_interpreter(settings.interpreter.as_deref())?;
  let explicit = settings.engine.as_deref();

  let by_path = || {
    engine_on_path(explicit).map(|path| EngineCommand {
      interpreter: interpreter.clone(),
      entry: vec![path.into_os_string()],
    })
  };
  let by_module = || {
    module_available(&interpreter).then(|| EngineCommand {
      interpreter: interpreter.clone(),
      entry: vec!["-m".into(), ENGINE_MODULE.into()],
    })
  };

  let resolved = match settings.strategy {
    EngineStrategy::SearchPath => by_path(),
    EngineStrategy::Module => by_module(),
    // An explicitly configured engine never falls back to the module.
    EngineStrategy::Auto if explicit.is_some() => by_path(),
    EngineStrategy::Auto => by_path().or_else(by_module),
  };

  let command = resolved.ok_or_else(|| {
    let wanted = explicit.unwrap_or(Path::new(ENGINE_NAME)).display().to_string();
    LaunchError::EngineNotFound(match settings.strategy {
      EngineStrategy::SearchPath => format!("{} not found", wanted),
      EngineStrategy::Module => format!("{} cannot import {}", interpreter.display(), ENGINE_MODULE),
      EngineStrategy::Auto => format!(
        "{} not found and {} cannot import {}",
        wanted,
        interpreter.display(),
        ENGINE_MODULE
      ),
    })
  })?;

  info!(interpreter = %command.interpreter.display(), entry = ?command.entry, "resolved build engine");
  Ok(command)
}

/// Exit code of a finished child. A Unix signal death maps to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
  if let Some(code) = status.code() {
    return code;
  }

  #[cfg(unix)]
  {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = status.signal() {
      return 128 + signal;
    }
  }

  1
}

/// Spawn the engine in `cwd` and wait for it.
pub fn run(command: &EngineCommand, definition: &Path, forwarded: &[OsString], cwd: &Path) -> Result<i32, LaunchError> {
  let argv = command.argv(definition, forwarded);
  debug!(?argv, cwd = %cwd.display(), "spawning build engine");

  let status = Command::new(&argv[0])
    .args(&argv[1..])
    .current_dir(cwd)
    .status()
    .map_err(|source| LaunchError::Spawn {
      program: command.interpreter.clone(),
      source,
    })?;

  let code = exit_code(status);
  info!(code, "build engine finished");
  Ok(code)
}

/// Resolve the engine, describe and render the project, then run the engine on it.
///
/// Returns the engine's exit code. Every failure before the spawn is returned
/// as an error and leaves no definition behind.
pub fn launch(settings: &Settings, probe: &dyn ToolchainProbe, forwarded: &[OsString]) -> Result<i32, CrateError> {
  let engine = resolve_engine(settings)?;

  let project = descriptor::describe(settings, probe)?;
  let definition = render_scons(&project)?;
  let path = project.definition_path();
  write_definition(&path, &definition)?;

  Ok(run(&engine, &path, forwarded, &project.root)?)
}
