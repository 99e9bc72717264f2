//! Package workers, one per supported package type.
//!
//! The set of package types is closed: every worker is a variant of
//! [`PackageWorker`] and is looked up by its type key.

use thiserror::Error;

use crate::build::{BuildResult, BuildSession, Options};
use crate::manifest::Manifest;
use crate::rpm::{RpmError, RpmWorker};
use crate::source::Reader;

/// Package type keys with a registered worker.
pub const REGISTERED_TYPES: &[&str] = &["rpm"];

/// Errors raised by a package worker.
#[derive(Debug, Error)]
pub enum WorkerError {
  #[error(transparent)]
  Rpm(#[from] RpmError),
}

impl WorkerError {
  /// The captured builder log, for failures that have one.
  pub fn log(&self) -> Option<&str> {
    match self {
      WorkerError::Rpm(e) => e.log(),
    }
  }
}

/// A worker able to build one package type.
#[derive(Debug, Clone)]
pub enum PackageWorker {
  Rpm(RpmWorker),
}

impl PackageWorker {
  /// The worker registered for `package_type`, if any.
  pub fn for_type(package_type: &str) -> Option<Self> {
    match package_type {
      "rpm" => Some(PackageWorker::Rpm(RpmWorker::new())),
      _ => None,
    }
  }

  pub fn package_type(&self) -> &'static str {
    match self {
      PackageWorker::Rpm(_) => "rpm",
    }
  }

  pub async fn build_packages(
    &self,
    manifest: &Manifest,
    options: &Options,
    reader: &dyn Reader,
    session: &BuildSession,
  ) -> Result<BuildResult, WorkerError> {
    match self {
      PackageWorker::Rpm(worker) => Ok(worker.build_packages(manifest, options, reader, session).await?),
    }
  }
}
