//! Running `rpmbuild` and reading its output.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use super::RpmError;
use crate::build::{Artifact, BuildResult, CancelToken};
use crate::exec::run_captured;

/// Build binary packages from `spec` using `buildroot` as the install root.
///
/// A non-zero exit is an error carrying the full log. Error lines printed by a
/// successful run are reported in [`BuildResult::error`].
pub async fn run_rpmbuild(
  command: &str,
  spec: &Path,
  buildroot: &Path,
  target_arch: &str,
  cancel: &CancelToken,
) -> Result<BuildResult, RpmError> {
  let args: Vec<OsString> = vec![
    "-bb".into(),
    spec.into(),
    "-vv".into(),
    "--buildroot".into(),
    buildroot.into(),
    "--target".into(),
    target_arch.into(),
  ];

  let output = run_captured(command, &args, cancel).await?;
  let error = builder_error(&output.log);

  if !output.status.success() {
    return Err(RpmError::BuilderFailed {
      code: output.status.code(),
      error: error.unwrap_or_else(|| "no error reported".to_string()),
      log: output.log,
    });
  }

  let artifacts: Vec<Artifact> = find_artifacts(&output.log)
    .into_iter()
    .map(|path| Artifact { path })
    .collect();
  info!(artifacts = artifacts.len(), "rpmbuild finished");

  Ok(BuildResult {
    package_type: "rpm".to_string(),
    artifacts,
    log: output.log,
    error,
  })
}

fn wrote_regex() -> &'static Regex {
  static WROTE_REGEX: OnceLock<Regex> = OnceLock::new();
  WROTE_REGEX.get_or_init(|| Regex::new(r"^Wrote:\s(\S+\.rpm)$").expect("Invalid Wrote regex"))
}

/// Every package path announced by a `Wrote: <path>.rpm` line, in log order.
pub fn find_artifacts(log: &str) -> Vec<PathBuf> {
  log
    .lines()
    .filter_map(|line| wrote_regex().captures(line))
    .map(|caps| PathBuf::from(&caps[1]))
    .collect()
}

/// The `error:` lines of a build log, joined, if there are any.
pub fn builder_error(log: &str) -> Option<String> {
  let lines: Vec<&str> = log.lines().filter(|l| l.starts_with("error:")).collect();
  if lines.is_empty() { None } else { Some(lines.join("\n")) }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE_LOG: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rpmbuild.log"));

  #[test]
  fn find_artifacts_in_sample_log() {
    assert_eq!(
      find_artifacts(SAMPLE_LOG),
      vec![
        PathBuf::from("/home/builder/rpmbuild/RPMS/noarch/test-docs-v1.0.0-1.noarch.rpm"),
        PathBuf::from("/home/builder/rpmbuild/RPMS/noarch/test-v1.0.0-1.noarch.rpm"),
      ]
    );
  }

  #[test]
  fn builder_error_collects_error_lines() {
    let log = "Building\nerror: File not found: /x\nwarning: meh\nerror: Bad exit status\n";
    assert_eq!(
      builder_error(log).as_deref(),
      Some("error: File not found: /x\nerror: Bad exit status")
    );
    assert_eq!(builder_error(SAMPLE_LOG), None);
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn nonzero_exit_carries_log() {
    use crate::util::testutil::write_script;

    let dir = tempfile::TempDir::new().unwrap();
    let fake = write_script(dir.path(), "rpmbuild", "echo 'error: Bad file'\nexit 1");

    let err = run_rpmbuild(
      &fake.to_string_lossy(),
      Path::new("/tmp/x.spec"),
      dir.path(),
      "noarch",
      &CancelToken::new(),
    )
    .await
    .unwrap_err();

    match err {
      RpmError::BuilderFailed { code, error, log } => {
        assert_eq!(code, Some(1));
        assert_eq!(error, "error: Bad file");
        assert!(log.contains("error: Bad file"));
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn passes_spec_buildroot_and_target() {
    use crate::util::testutil::write_script;

    let dir = tempfile::TempDir::new().unwrap();
    let fake = write_script(dir.path(), "rpmbuild", "echo \"$@\"\necho 'Wrote: /out/pkg-1.0-0.x86_64.rpm'");

    let result = run_rpmbuild(
      &fake.to_string_lossy(),
      Path::new("/tmp/x.spec"),
      Path::new("/tmp/root"),
      "x86_64",
      &CancelToken::new(),
    )
    .await
    .unwrap();

    assert!(result.log.contains("-bb /tmp/x.spec -vv --buildroot /tmp/root --target x86_64"));
    assert_eq!(result.artifacts, vec![Artifact {
      path: PathBuf::from("/out/pkg-1.0-0.x86_64.rpm")
    }]);
    assert_eq!(result.error, None);
  }
}
