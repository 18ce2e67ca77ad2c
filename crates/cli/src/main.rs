//! `bld`: describe the tatdylf build and run the build engine on it.
//!
//! Takes no options of its own. Every argument, `--` and `--help` included,
//! is passed to the engine unchanged after `-f <definition>`, and `bld` exits
//! with the engine's exit code.

// Shared with `bld-graph`; `bld` only reports errors.
#[allow(dead_code)]
mod output;

use std::ffi::OsString;

use anyhow::{Context, Result};
use tatdylf_build_lib::config::Settings;
use tatdylf_build_lib::launcher::launch;
use tatdylf_build_lib::toolchain::HostProbe;

use crate::output::print_error;

fn main() {
  output::init_tracing();

  let forwarded: Vec<OsString> = std::env::args_os().skip(1).collect();

  match run(&forwarded) {
    Ok(code) => std::process::exit(code),
    Err(err) => {
      print_error(&format!("{:#}", err));
      std::process::exit(1);
    }
  }
}

fn run(forwarded: &[OsString]) -> Result<i32> {
  let settings = Settings::from_env().context("invalid settings")?;
  let probe = HostProbe::from_settings(&settings);
  Ok(launch(&settings, &probe, forwarded)?)
}
