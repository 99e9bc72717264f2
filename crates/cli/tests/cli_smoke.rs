//! CLI smoke tests for baggr.
//!
//! These tests run the binary end to end. Builds use a fake rpmbuild script
//! selected through `BAGGR_RPMBUILD`.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the baggr binary.
fn baggr_cmd() -> Command {
  let mut cmd = cargo_bin_cmd!("baggr");
  cmd.env_remove("RUST_LOG");
  cmd
}

const MANIFEST: &str = r#"
name: hello
license: MIT
summary: Says hello
version: 1.0.0
release: 1
files:
  - source: bin/hello
    destination: /usr/bin/hello
    mode: "0755"
  - source: "%DIR%"
    destination: /var/lib/hello
"#;

/// A project directory with a manifest and its sources.
fn project(manifest: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::create_dir_all(temp.path().join("bin")).unwrap();
  std::fs::write(temp.path().join("bin/hello"), "#!/bin/sh\necho hello\n").unwrap();
  std::fs::write(temp.path().join("baggr.yaml"), manifest).unwrap();
  temp
}

#[cfg(unix)]
fn fake_rpmbuild(dir: &Path, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join("fake-rpmbuild");
  std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  let mut perms = std::fs::metadata(&path).unwrap().permissions();
  perms.set_mode(0o755);
  std::fs::set_permissions(&path, perms).unwrap();
  path
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  baggr_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  baggr_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("baggr"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "validate", "info"] {
    baggr_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// Info
// =============================================================================

#[test]
fn info_lists_package_types() {
  baggr_cmd()
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("rpm"));
}

#[test]
fn info_json_is_valid() {
  let output = baggr_cmd().args(["info", "--output", "json"]).output().unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["name"], "baggr");
  assert_eq!(json["package_types"][0], "rpm");
}

// =============================================================================
// Validate
// =============================================================================

#[test]
fn validate_accepts_complete_project() {
  let temp = project(MANIFEST);

  baggr_cmd()
    .current_dir(temp.path())
    .args(["validate", "baggr.yaml"])
    .assert()
    .success()
    .stdout(predicate::str::contains("is valid"));
}

#[test]
fn validate_reports_all_missing_sources() {
  let temp = project(&format!("{}  - source: missing-one\n  - source: missing-two\n", MANIFEST));

  baggr_cmd()
    .current_dir(temp.path())
    .args(["validate", "-m", "baggr.yaml"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing-one").and(predicate::str::contains("missing-two")));
}

#[test]
fn validate_rejects_absolute_sources() {
  let temp = project(&MANIFEST.replace("source: bin/hello", "source: /bin/hello"));

  baggr_cmd()
    .current_dir(temp.path())
    .args(["validate", "baggr.yaml"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("absolute source paths"));
}

// =============================================================================
// Build
// =============================================================================

#[test]
fn build_rejects_manifest_given_twice() {
  let temp = project(MANIFEST);

  baggr_cmd()
    .current_dir(temp.path())
    .args(["build", "baggr.yaml", "--manifest", "baggr.yaml"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn build_requires_a_manifest() {
  baggr_cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no manifest given"));
}

#[test]
fn build_missing_manifest_file_fails() {
  let temp = TempDir::new().unwrap();

  baggr_cmd()
    .current_dir(temp.path())
    .args(["build", "does-not-exist.yaml"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("does-not-exist.yaml"));
}

#[cfg(unix)]
#[test]
fn build_prints_artifacts() {
  let temp = project(MANIFEST);
  let builder = fake_rpmbuild(temp.path(), "echo 'Wrote: /rpms/hello-2.0.0-3.noarch.rpm'");

  baggr_cmd()
    .current_dir(temp.path())
    .env("BAGGR_RPMBUILD", &builder)
    .args(["build", "baggr.yaml", "-v", "2.0.0", "-r", "3"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Built hello 2.0.0-3").and(predicate::str::contains("/rpms/hello-2.0.0-3.noarch.rpm")));
}

#[cfg(unix)]
#[test]
fn build_json_report() {
  let temp = project(MANIFEST);
  let builder = fake_rpmbuild(temp.path(), "echo 'Wrote: /rpms/hello-1.0.0-1.noarch.rpm'");

  let output = baggr_cmd()
    .current_dir(temp.path())
    .env("BAGGR_RPMBUILD", &builder)
    .args(["build", "-m", "baggr.yaml", "--output", "json", "--target", "x86_64"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["version"], "1.0.0");
  assert_eq!(json["release"], "1");
  assert_eq!(json["results"][0]["artifacts"][0]["path"], "/rpms/hello-1.0.0-1.noarch.rpm");
}

#[cfg(unix)]
#[test]
fn build_last_version_computes_next() {
  let temp = project(&MANIFEST.replace("version: 1.0.0\nrelease: 1\n", ""));
  let builder = fake_rpmbuild(temp.path(), "echo 'Wrote: /rpms/hello.rpm'");

  baggr_cmd()
    .current_dir(temp.path())
    .env("BAGGR_RPMBUILD", &builder)
    .args(["build", "baggr.yaml", "--last-version", "1.4.2"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Built hello 1.4.3-0"));
}

#[cfg(unix)]
#[test]
fn build_failure_shows_builder_log() {
  let temp = project(MANIFEST);
  let builder = fake_rpmbuild(temp.path(), "echo 'Executing(%prep)'\necho 'error: Bad exit status from %prep' >&2\nexit 1");

  baggr_cmd()
    .current_dir(temp.path())
    .env("BAGGR_RPMBUILD", &builder)
    .args(["build", "baggr.yaml"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Executing(%prep)").and(predicate::str::contains("Build failed")));
}

#[cfg(unix)]
#[test]
fn build_timeout_fails() {
  let temp = project(MANIFEST);
  let builder = fake_rpmbuild(temp.path(), "sleep 30");

  baggr_cmd()
    .current_dir(temp.path())
    .env("BAGGR_RPMBUILD", &builder)
    .args(["build", "baggr.yaml", "--timeout", "1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("deadline exceeded"));
}

#[test]
fn build_unknown_type_fails() {
  let temp = project(MANIFEST);

  baggr_cmd()
    .current_dir(temp.path())
    .args(["build", "baggr.yaml", "-t", "deb"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no worker defined for package type deb"));
}
