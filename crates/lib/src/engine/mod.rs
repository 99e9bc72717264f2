//! Build orchestration.
//!
//! The [`Engine`] drives one build through a fixed sequence of states:
//!
//! ```text
//! Idle -> ManifestParsed -> ReaderResolved -> VersionResolved
//!      -> Dispatching(type) ... -> Done
//! ```
//!
//! Any failure moves straight to `Failed`; package types after the failing
//! one are not attempted and no partial report is returned.

mod error;

use std::path::Path;

use tracing::{debug, error, info};

use crate::build::{BuildReport, BuildSession, Options};
use crate::manifest::Manifest;
use crate::source::{FilesystemReader, Reader, SourceError};
use crate::version::ensure_version;
use crate::worker::PackageWorker;

pub use error::{EngineError, ErrorKind};

/// Where the engine is in a build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineState {
  #[default]
  Idle,
  ManifestParsed,
  ReaderResolved,
  VersionResolved,
  Dispatching(String),
  Done,
  Failed,
}

/// Runs builds, one at a time.
#[derive(Debug, Default)]
pub struct Engine {
  state: EngineState,
}

impl Engine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> &EngineState {
    &self.state
  }

  fn transition(&mut self, next: EngineState) {
    debug!(from = ?self.state, to = ?next, "engine state");
    self.state = next;
  }

  /// Build every package type requested in `options`.
  pub async fn build(&mut self, options: &Options) -> Result<BuildReport, EngineError> {
    self.transition(EngineState::Idle);

    match self.run(options).await {
      Ok(report) => {
        self.transition(EngineState::Done);
        Ok(report)
      }
      Err(e) => {
        error!(kind = ?e.kind(), error = %e, "build failed");
        self.transition(EngineState::Failed);
        Err(e)
      }
    }
  }

  async fn run(&mut self, options: &Options) -> Result<BuildReport, EngineError> {
    options.validate()?;
    let cancel = options.build_token();
    cancel.check()?;

    let manifest = Manifest::from_file(&options.manifest_path)?;
    self.transition(EngineState::ManifestParsed);

    manifest.reject_absolute_sources()?;
    let default_reader;
    let reader: &dyn Reader = match &options.source_reader {
      Some(reader) => &**reader,
      None => {
        default_reader = FilesystemReader::new(&options.source_dir);
        info!(root = %options.source_dir.display(), "reading sources from filesystem");
        &default_reader
      }
    };
    self.transition(EngineState::ReaderResolved);

    check_source_files(&manifest, reader)?;

    let mut session = BuildSession::new(cancel);
    ensure_version(&manifest, options, &mut session)?;
    self.transition(EngineState::VersionResolved);

    let mut results = Vec::with_capacity(options.package_types.len());
    for package_type in &options.package_types {
      session.cancel().check()?;

      let worker =
        PackageWorker::for_type(package_type).ok_or_else(|| EngineError::NoWorker(package_type.clone()))?;
      self.transition(EngineState::Dispatching(package_type.clone()));
      info!(package_type = %package_type, "building packages");

      let result = worker
        .build_packages(&manifest, options, reader, &session)
        .await
        .map_err(|e| EngineError::Worker {
          package_type: package_type.clone(),
          source: e,
        })?;
      results.push(result);
    }

    let version = session.version()?;
    Ok(BuildReport {
      name: manifest.component.name.clone(),
      version: version.version.clone(),
      release: version.release.clone(),
      results,
    })
  }
}

/// Probe every non-sentinel source through `reader`.
///
/// Missing sources are collected and reported together; any other failure is
/// returned immediately.
pub fn check_source_files(manifest: &Manifest, reader: &dyn Reader) -> Result<(), EngineError> {
  let mut missing = Vec::new();

  for file in manifest.files().filter(|f| !f.is_dir_sentinel()) {
    match reader.open_path(file) {
      Ok(_) => {}
      Err(SourceError::NotFound(path)) => missing.push(path),
      Err(e) => {
        return Err(EngineError::SourceCheck {
          path: file.source.clone(),
          source: e,
        });
      }
    }
  }

  if missing.is_empty() {
    Ok(())
  } else {
    Err(EngineError::MissingSources { missing })
  }
}

/// Parse a manifest and verify its sources without building anything.
pub fn validate_manifest(path: &Path, source_dir: &Path) -> Result<Manifest, EngineError> {
  let manifest = Manifest::from_file(path)?;
  manifest.reject_absolute_sources()?;
  check_source_files(&manifest, &FilesystemReader::new(source_dir))?;
  Ok(manifest)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::{Component, FileEntry};
  use crate::util::testutil::write_tree;
  use tempfile::TempDir;

  fn manifest(files: Vec<FileEntry>) -> Manifest {
    Manifest {
      component: Component {
        name: "test".to_string(),
        files,
        ..Default::default()
      },
      ..Default::default()
    }
  }

  #[test]
  fn check_source_files_reports_every_missing_path() {
    let src = TempDir::new().unwrap();
    write_tree(src.path(), &[("present.txt", "x")]);
    let mut m = manifest(vec![
      FileEntry::new("missing-a.txt", ""),
      FileEntry::new("present.txt", ""),
      FileEntry::new("%DIR%", "/empty"),
    ]);
    m.components.push(Component {
      name: "docs".to_string(),
      files: vec![FileEntry::new("missing-b", "")],
      ..Default::default()
    });

    let err = check_source_files(&m, &FilesystemReader::new(src.path())).unwrap_err();

    match err {
      EngineError::MissingSources { missing } => assert_eq!(missing, vec!["missing-a.txt", "missing-b"]),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn check_source_files_accepts_directories() {
    let src = TempDir::new().unwrap();
    write_tree(src.path(), &[("docs/index.md", "x")]);

    let m = manifest(vec![FileEntry::new("docs", "/usr/share/doc/test")]);

    assert!(check_source_files(&m, &FilesystemReader::new(src.path())).is_ok());
  }

  #[test]
  fn check_source_files_flags_escaping_source_as_security() {
    let src = TempDir::new().unwrap();
    let m = manifest(vec![FileEntry::new("../outside", "")]);

    let err = check_source_files(&m, &FilesystemReader::new(src.path())).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Security);
  }

  #[test]
  fn validate_manifest_rejects_absolute_sources() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("baggr.yaml");
    std::fs::write(&path, "name: test\nfiles:\n  - source: /etc/passwd\n  - source: /etc/hosts\n").unwrap();

    let err = validate_manifest(&path, dir.path()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("/etc/passwd"));
    assert!(err.to_string().contains("/etc/hosts"));
  }

  #[tokio::test]
  async fn invalid_options_fail_before_reading_manifest() {
    let mut engine = Engine::new();

    let err = engine.build(&Options::default()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(engine.state(), &EngineState::Failed);
  }
}
