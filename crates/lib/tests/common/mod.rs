//! Shared helpers for engine integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use baggr_lib::build::Options;
use tempfile::TempDir;

/// Isolated build environment: a source tree, a manifest and a fake rpmbuild.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    for dir in ["src", "tools", "out"] {
      fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    Self { temp }
  }

  pub fn src(&self) -> PathBuf {
    self.temp.path().join("src")
  }

  /// Directory the fake builder can drop evidence into.
  pub fn out(&self) -> PathBuf {
    self.temp.path().join("out")
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.temp.path().join("baggr.yaml")
  }

  /// Write a source file relative to the source tree.
  pub fn write_source(&self, relative_path: &str, content: &str) {
    write_file(&self.src().join(relative_path), content);
  }

  pub fn write_manifest(&self, content: &str) {
    write_file(&self.manifest_path(), content);
  }

  /// Install a fake rpmbuild running `body` and return its path.
  pub fn fake_rpmbuild(&self, body: &str) -> PathBuf {
    let path = self.temp.path().join("tools").join("rpmbuild");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
  }

  /// Options pointing at this environment and the given builder.
  pub fn options(&self, builder: &Path) -> Options {
    let mut options = Options::new(self.manifest_path());
    options.source_dir = self.src();
    options.builder_command = builder.to_string_lossy().into_owned();
    options
  }
}

fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, content).unwrap();
}
