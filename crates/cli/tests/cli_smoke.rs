//! CLI smoke tests for `bld` and `bld-graph`.
//!
//! A fake Visual C++ install and a fake checkout are laid out in a temp
//! directory; `/bin/sh` stands in for Python and a shell script for SCons.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const LIBS: [&str; 4] = ["kernel32.lib", "ws2_32.lib", "user32.lib", "shell32.lib"];

struct TestEnv {
  _temp: TempDir,
  base: PathBuf,
}

impl TestEnv {
  fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let base = std::fs::canonicalize(temp.path()).unwrap();

    let vc = base.join("VC");
    for bin in [vc.join("bin"), vc.join("bin").join("amd64")] {
      std::fs::create_dir_all(&bin).unwrap();
      for tool in ["cl.exe", "link.exe", "rc.exe"] {
        std::fs::write(bin.join(tool), "").unwrap();
      }
    }
    for lib in [vc.join("lib"), vc.join("lib").join("amd64")] {
      std::fs::create_dir_all(&lib).unwrap();
      for name in LIBS {
        std::fs::write(lib.join(name), "").unwrap();
      }
    }

    let src = base.join("work").join("tatdylf").join("src");
    std::fs::create_dir_all(&src).unwrap();
    for name in ["tatdylf.cpp", "tatdylf_ui.cpp", "tatdylf.rc"] {
      std::fs::write(src.join(name), "").unwrap();
    }
    std::fs::write(base.join("work").join("tatdylf.ini"), "").unwrap();

    Self { _temp: temp, base }
  }

  fn root(&self) -> PathBuf {
    self.base.join("work").join("tatdylf")
  }

  fn definition(&self) -> PathBuf {
    self.root().join("build").join("tatdylf.scons")
  }

  fn engine(&self) -> PathBuf {
    self.base.join("fake-scons")
  }

  fn argv_log(&self) -> PathBuf {
    self.base.join("argv.log")
  }

  /// Fake engine that records its arguments and exits with `code`.
  fn write_engine(&self, code: i32) {
    let script = format!(
      "printf '%s\\n' \"$@\" > '{}'\nexit {}\n",
      self.argv_log().display(),
      code
    );
    std::fs::write(self.engine(), script).unwrap();
  }

  fn cmd(&self, bin: &str) -> Command {
    let mut cmd = match bin {
      "bld" => cargo_bin_cmd!("bld"),
      _ => cargo_bin_cmd!("bld-graph"),
    };
    cmd
      .env("TATDYLF_PROJECT_ROOT", self.root())
      .env("TATDYLF_TOOLCHAIN_DIR", self.base.join("VC"))
      .env("TATDYLF_PYTHON", "/bin/sh")
      .env("TATDYLF_ENGINE", self.engine())
      .env("TATDYLF_ENGINE_STRATEGY", "path")
      .env_remove("TATDYLF_PRESET")
      .env_remove("TATDYLF_ARCH")
      .env_remove("TATDYLF_SDK_DIR")
      .env_remove("TATDYLF_SQUAB");
    cmd
  }
}

// =============================================================================
// bld-graph
// =============================================================================

#[test]
fn graph_help_works() {
  cargo_bin_cmd!("bld-graph")
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn graph_version_works() {
  cargo_bin_cmd!("bld-graph")
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("bld-graph"));
}

#[test]
fn graph_prints_transformed_default_for_x64() {
  let env = TestEnv::new();
  env
    .cmd("bld-graph")
    .assert()
    .success()
    .stdout(predicate::str::starts_with("# bld graph "))
    .stdout(predicate::str::contains("Default(a4)"))
    .stdout(predicate::str::contains("env.Alias('install', a5)"));
}

#[test]
fn graph_prints_plain_default_for_x86() {
  let env = TestEnv::new();
  env
    .cmd("bld-graph")
    .args(["--arch", "x86"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Default(a3)"))
    .stdout(predicate::str::contains("squab").not());
}

#[test]
fn graph_json_lists_libraries_in_order() {
  let env = TestEnv::new();
  let output = env
    .cmd("bld-graph")
    .args(["--format", "json", "--preset", "legacy"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(value["preset"], "legacy");
  assert_eq!(value["config"]["arch"], "x86");
  let program = &value["graph"]["artifacts"][3]["artifact"];
  assert_eq!(program["kind"]["libs"], serde_json::json!(LIBS));
}

#[test]
fn graph_writes_output_file() {
  let env = TestEnv::new();
  let out = env.base.join("out.scons");
  env
    .cmd("bld-graph")
    .arg("--output")
    .arg(&out)
    .assert()
    .success()
    .stderr(predicate::str::contains("wrote"));
  assert!(std::fs::read_to_string(&out).unwrap().starts_with("# bld graph "));
}

#[test]
fn graph_rejects_unknown_arch_flag() {
  let env = TestEnv::new();
  env
    .cmd("bld-graph")
    .args(["--arch", "arm64"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown architecture"));
}

// =============================================================================
// bld
// =============================================================================

#[cfg(unix)]
#[test]
fn bld_propagates_engine_exit_code() {
  let env = TestEnv::new();
  for code in [0, 1, 2, 127] {
    env.write_engine(code);
    env.cmd("bld").assert().code(code);
  }
}

#[cfg(unix)]
#[test]
fn bld_passes_definition_then_forwarded_args() {
  let env = TestEnv::new();
  env.write_engine(0);

  env.cmd("bld").args(["-j4", "--help", "install"]).assert().success();

  let logged = std::fs::read_to_string(env.argv_log()).unwrap();
  let definition = env.definition().display().to_string();
  assert_eq!(
    logged.lines().collect::<Vec<_>>(),
    ["-f", definition.as_str(), "-j4", "--help", "install"]
  );
  assert!(std::fs::read_to_string(env.definition()).unwrap().starts_with("# bld graph "));
}

#[cfg(unix)]
#[test]
fn bld_forwards_double_dash() {
  let env = TestEnv::new();
  env.write_engine(0);

  env.cmd("bld").args(["--", "install"]).assert().success();

  let logged = std::fs::read_to_string(env.argv_log()).unwrap();
  let definition = env.definition().display().to_string();
  assert_eq!(
    logged.lines().collect::<Vec<_>>(),
    ["-f", definition.as_str(), "--", "install"]
  );
}

#[cfg(unix)]
#[test]
fn bld_unknown_arch_fails_before_anything_is_declared() {
  let env = TestEnv::new();
  env.write_engine(0);

  env
    .cmd("bld")
    .env("TATDYLF_ARCH", "arm64")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("unknown architecture 'arm64'"));
  assert!(!env.definition().exists());
  assert!(!env.argv_log().exists());
}

#[cfg(unix)]
#[test]
fn bld_missing_engine_is_fatal() {
  let env = TestEnv::new();

  env
    .cmd("bld")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("build engine not found"));
  assert!(!env.definition().exists());
}

#[cfg(unix)]
#[test]
fn bld_missing_source_leaves_no_definition() {
  let env = TestEnv::new();
  env.write_engine(0);
  std::fs::remove_file(env.root().join("src").join("tatdylf_ui.cpp")).unwrap();

  env
    .cmd("bld")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("source file not found"));
  assert!(!env.definition().exists());
  assert!(!env.argv_log().exists());
}
