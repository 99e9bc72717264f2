use serde::Serialize;
use thiserror::Error;

use crate::build::{Interrupted, OptionsError};
use crate::exec::ExecError;
use crate::manifest::ManifestError;
use crate::rpm::RpmError;
use crate::source::SourceError;
use crate::version::VersionError;
use crate::worker::WorkerError;

/// Broad class of a build failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  /// Missing or conflicting settings.
  Configuration,
  /// The manifest or its sources are unacceptable.
  Validation,
  Io,
  /// A path tried to leave its root.
  Security,
  /// The external builder failed.
  ExternalTool,
  /// Cancelled or out of time.
  Interrupted,
}

/// Errors that end a build.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("invalid options: {0}")]
  Options(#[from] OptionsError),

  #[error("parsing manifest: {0}")]
  Manifest(#[from] ManifestError),

  #[error("source files not found: {}", missing.join(", "))]
  MissingSources { missing: Vec<String> },

  #[error("checking source {path}: {source}")]
  SourceCheck { path: String, source: SourceError },

  #[error("ensuring package version: {0}")]
  Version(#[from] VersionError),

  #[error("no worker defined for package type {0}")]
  NoWorker(String),

  #[error("building {package_type} packages: {source}")]
  Worker { package_type: String, source: WorkerError },

  #[error(transparent)]
  Interrupted(#[from] Interrupted),
}

impl EngineError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      EngineError::Options(_) | EngineError::NoWorker(_) => ErrorKind::Configuration,
      EngineError::Manifest(e) => manifest_kind(e),
      EngineError::MissingSources { .. } => ErrorKind::Validation,
      EngineError::SourceCheck { source, .. } => source_kind(source),
      EngineError::Version(e) => version_kind(e),
      EngineError::Worker { source, .. } => match source {
        WorkerError::Rpm(e) => rpm_kind(e),
      },
      EngineError::Interrupted(_) => ErrorKind::Interrupted,
    }
  }

  /// The captured builder log, for failures that have one.
  pub fn log(&self) -> Option<&str> {
    match self {
      EngineError::Worker { source, .. } => source.log(),
      _ => None,
    }
  }
}

fn manifest_kind(e: &ManifestError) -> ErrorKind {
  match e {
    ManifestError::Read { .. } => ErrorKind::Io,
    ManifestError::Decode(_) | ManifestError::AbsoluteSources { .. } => ErrorKind::Validation,
  }
}

fn source_kind(e: &SourceError) -> ErrorKind {
  match e {
    SourceError::AccessViolation { .. } | SourceError::InvalidPath(_) => ErrorKind::Security,
    SourceError::NoStagingRoot => ErrorKind::Configuration,
    SourceError::NotFound(_) => ErrorKind::Validation,
    SourceError::Interrupted(_) => ErrorKind::Interrupted,
    SourceError::UnexpectedDirectory(_)
    | SourceError::Open { .. }
    | SourceError::Walk { .. }
    | SourceError::CreateDir { .. }
    | SourceError::CreateFile { .. }
    | SourceError::Copy { .. } => ErrorKind::Io,
  }
}

fn version_kind(e: &VersionError) -> ErrorKind {
  match e {
    VersionError::Parse { .. } | VersionError::Overflow(_) => ErrorKind::Validation,
    VersionError::Lookup(_) => ErrorKind::ExternalTool,
    VersionError::NoReader | VersionError::AlreadyResolved(_) | VersionError::Unresolved => ErrorKind::Configuration,
  }
}

fn rpm_kind(e: &RpmError) -> ErrorKind {
  match e {
    RpmError::NoFiles => ErrorKind::Validation,
    RpmError::Version(v) => version_kind(v),
    RpmError::Template(_) => ErrorKind::Configuration,
    RpmError::WriteSpec { .. } | RpmError::BuildRoot { .. } => ErrorKind::Io,
    RpmError::Stage { source, .. } => source_kind(source),
    RpmError::Exec(ExecError::Spawn { .. }) => ErrorKind::ExternalTool,
    RpmError::Exec(ExecError::Io(_)) => ErrorKind::Io,
    RpmError::Exec(ExecError::Interrupted(_)) => ErrorKind::Interrupted,
    RpmError::BuilderFailed { .. } => ErrorKind::ExternalTool,
  }
}
