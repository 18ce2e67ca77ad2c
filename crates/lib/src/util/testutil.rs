//! Test fixtures: a fake MSVC install and a fake tatdylf checkout on disk.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::consts::{RESOURCE_SCRIPT, SIBLING_CONFIG, SOURCES, SRC_DIR, SYSTEM_LIBS};
use crate::toolchain::HostProbe;

/// A Visual C++ directory layout with empty tool and library files.
pub struct FakeToolchain {
  temp: TempDir,
}

impl FakeToolchain {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let vc = temp.path().join("VC");

    for bin in [vc.join("bin"), vc.join("bin").join("amd64")] {
      std::fs::create_dir_all(&bin).unwrap();
      for tool in ["cl.exe", "link.exe", "rc.exe"] {
        std::fs::write(bin.join(tool), "").unwrap();
      }
    }
    for lib in [vc.join("lib"), vc.join("lib").join("amd64")] {
      std::fs::create_dir_all(&lib).unwrap();
      for name in SYSTEM_LIBS {
        std::fs::write(lib.join(name), "").unwrap();
      }
    }
    std::fs::create_dir_all(vc.join("include")).unwrap();

    Self { temp }
  }

  /// The Visual Studio install root (parent of `VC`).
  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn vc(&self) -> PathBuf {
    self.temp.path().join("VC")
  }

  pub fn probe(&self) -> HostProbe {
    HostProbe::new(Some(self.vc()), None)
  }
}

/// `<parent>/tatdylf/src/{tatdylf.cpp, tatdylf_ui.cpp, tatdylf.rc}` plus
/// `<parent>/tatdylf.ini`.
pub struct FakeProject {
  temp: TempDir,
}

impl FakeProject {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("tatdylf").join(SRC_DIR);
    std::fs::create_dir_all(&src).unwrap();
    for name in SOURCES {
      std::fs::write(src.join(name), "int x;\n").unwrap();
    }
    std::fs::write(src.join(RESOURCE_SCRIPT), "\n").unwrap();
    std::fs::write(temp.path().join(SIBLING_CONFIG), "[tatdylf]\n").unwrap();

    Self { temp }
  }

  /// Canonical, so assertions hold on hosts with symlinked temp dirs.
  pub fn parent(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn root(&self) -> PathBuf {
    self.parent().join("tatdylf")
  }

  pub fn remove(&self, relative: &str) {
    std::fs::remove_file(self.root().join(relative)).unwrap();
  }
}
