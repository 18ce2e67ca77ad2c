//! End-to-end checks of the tatdylf build description through the public API.

use std::path::{Path, PathBuf};

use tatdylf_build_lib::config::{Arch, Preset};
use tatdylf_build_lib::descriptor::{Project, describe_preset};
use tatdylf_build_lib::env::SquabOptions;
use tatdylf_build_lib::graph::{Action, ArtifactKind};
use tatdylf_build_lib::toolchain::HostProbe;
use tempfile::TempDir;

const LIBS: [&str; 4] = ["kernel32.lib", "ws2_32.lib", "user32.lib", "shell32.lib"];

/// A fake VC install plus a fake checkout under `<temp>/work/tatdylf`.
struct Fixture {
  _temp: TempDir,
  vc: PathBuf,
  parent: PathBuf,
}

impl Fixture {
  fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let base = dunce::canonicalize(temp.path()).unwrap();

    let vc = base.join("VC");
    for bin in [vc.join("bin"), vc.join("bin/amd64")] {
      std::fs::create_dir_all(&bin).unwrap();
      for tool in ["cl.exe", "link.exe", "rc.exe"] {
        std::fs::write(bin.join(tool), "").unwrap();
      }
    }
    for lib in [vc.join("lib"), vc.join("lib/amd64")] {
      std::fs::create_dir_all(&lib).unwrap();
      for name in LIBS {
        std::fs::write(lib.join(name), "").unwrap();
      }
    }

    let parent = base.join("work");
    let src = parent.join("tatdylf/src");
    std::fs::create_dir_all(&src).unwrap();
    for name in ["tatdylf.cpp", "tatdylf_ui.cpp", "tatdylf.rc"] {
      std::fs::write(src.join(name), "").unwrap();
    }
    std::fs::write(parent.join("tatdylf.ini"), "").unwrap();

    Self {
      _temp: temp,
      vc,
      parent,
    }
  }

  fn root(&self) -> PathBuf {
    self.parent.join("tatdylf")
  }

  fn describe(&self, preset: Preset, arch: Arch) -> tatdylf_build_lib::Result<Project> {
    let probe = HostProbe::new(Some(self.vc.clone()), None);
    describe_preset(preset, arch, &probe, &self.root(), SquabOptions::default())
  }
}

fn link_libs(project: &Project) -> Vec<String> {
  match &project.graph.artifact(project.program).unwrap().kind {
    ArtifactKind::Program { libs } => libs.clone(),
    other => panic!("program artifact has kind {other:?}"),
  }
}

fn link_args(project: &Project) -> Vec<String> {
  match &project.graph.artifact(project.program).unwrap().action {
    Action::Run(inv) => inv.args.clone(),
    other => panic!("program artifact has action {other:?}"),
  }
}

#[test]
fn library_order_is_preserved_for_every_configuration() {
  let fixture = Fixture::new();
  for preset in [Preset::Legacy, Preset::Release] {
    for arch in [Arch::X86, Arch::X64] {
      let project = fixture.describe(preset, arch).unwrap();
      assert_eq!(link_libs(&project), LIBS);
      let args = link_args(&project);
      assert_eq!(&args[args.len() - LIBS.len()..], LIBS);
    }
  }
}

#[test]
fn default_target_follows_architecture() {
  let fixture = Fixture::new();

  let x86 = fixture.describe(Preset::Release, Arch::X86).unwrap();
  assert_eq!(x86.graph.default_target(), Some(x86.program));

  let x64 = fixture.describe(Preset::Release, Arch::X64).unwrap();
  let target = x64.graph.default_target().unwrap();
  assert_eq!(x64.graph.artifact(target).unwrap().kind, ArtifactKind::Transformed);
  assert_eq!(x64.graph.inputs(target), vec![x64.program]);
}

#[test]
fn objects_can_be_scheduled_in_any_order() {
  let fixture = Fixture::new();
  let project = fixture.describe(Preset::Release, Arch::X64).unwrap();

  let objects: Vec<_> = project
    .graph
    .artifacts()
    .filter(|(_, a)| a.kind == ArtifactKind::Object)
    .map(|(id, _)| id)
    .collect();
  assert_eq!(objects.len(), 2);
  assert!(!project.graph.has_path(objects[0], objects[1]));
  assert!(!project.graph.has_path(objects[1], objects[0]));

  let waves = project.graph.waves().unwrap();
  assert!(objects.iter().all(|id| waves[0].contains(id)));
}

#[test]
fn install_goes_to_parent_bin_with_sibling_ini() {
  let fixture = Fixture::new();
  let project = fixture.describe(Preset::Release, Arch::X64).unwrap();
  let install = project.graph.artifact(project.install.unwrap()).unwrap();

  assert_eq!(
    install.kind,
    ArtifactKind::Install {
      dest: fixture.parent.join("bin")
    }
  );
  assert_eq!(install.sources, vec![fixture.parent.join("tatdylf.ini")]);
  assert!(!install.sources[0].starts_with(fixture.root()));
  assert_eq!(project.graph.inputs(project.install.unwrap()), vec![project.default_target]);
}

#[test]
fn missing_library_aborts_the_whole_description() {
  let fixture = Fixture::new();
  std::fs::remove_file(fixture.vc.join("lib/amd64/shell32.lib")).unwrap();

  let err = fixture.describe(Preset::Release, Arch::X64).unwrap_err();
  assert!(err.to_string().contains("shell32.lib"), "unexpected error: {err}");
  assert!(!Path::new(&fixture.root().join("build/tatdylf.scons")).exists());
}

#[test]
fn unknown_architecture_is_rejected_before_describing() {
  assert!("arm64".parse::<Arch>().is_err());
  assert!("ia64".parse::<Arch>().is_err());
}
