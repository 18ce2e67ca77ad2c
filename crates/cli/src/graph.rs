//! `bld-graph`: render the tatdylf build-graph definition without running anything.

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tatdylf_build_lib::config::{Arch, Preset, Settings};
use tatdylf_build_lib::descriptor::describe;
use tatdylf_build_lib::render::{render_json, render_scons, write_definition};
use tatdylf_build_lib::toolchain::HostProbe;

use crate::output::{print_error, print_success};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
  /// SCons build file, as handed to the engine
  #[default]
  Scons,
  /// Artifact graph with scheduling waves
  Json,
}

/// Print the tatdylf build-graph definition
#[derive(Parser)]
#[command(name = "bld-graph", version, about)]
struct Cli {
  /// Configuration preset (overrides TATDYLF_PRESET)
  #[arg(long)]
  preset: Option<Preset>,

  /// Target architecture (overrides TATDYLF_ARCH)
  #[arg(long)]
  arch: Option<Arch>,

  #[arg(long, value_enum, default_value_t = Format::Scons)]
  format: Format,

  /// Write to this file instead of stdout
  #[arg(short, long)]
  output: Option<PathBuf>,
}

fn main() {
  output::init_tracing();

  let cli = Cli::parse();
  if let Err(err) = run(cli) {
    print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let mut settings = Settings::from_env().context("invalid settings")?;
  if let Some(preset) = cli.preset {
    settings = settings.with_preset(preset);
  }
  if let Some(arch) = cli.arch {
    settings = settings.with_arch(arch);
  }

  let probe = HostProbe::from_settings(&settings);
  let project = describe(&settings, &probe)?;
  let definition = match cli.format {
    Format::Scons => render_scons(&project)?,
    Format::Json => render_json(&project)?,
  };

  match cli.output {
    Some(path) => {
      let written = write_definition(&path, &definition)?;
      let state = if written { "wrote" } else { "unchanged" };
      print_success(&format!("{} {} (graph {})", state, path.display(), definition.hash));
    }
    None => print!("{}", definition.contents),
  }

  Ok(())
}
