use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::CancelToken;
use crate::consts::{DEFAULT_RPMBUILD, DEFAULT_TARGET_ARCH, RPMBUILD_ENV};
use crate::source::Reader;
use crate::version::VersionReader;

/// Errors raised by [`Options::validate`].
#[derive(Debug, Error)]
pub enum OptionsError {
  #[error("no manifest path given")]
  EmptyManifestPath,

  #[error("no package types requested")]
  NoPackageTypes,

  #[error("target architecture must not be empty")]
  EmptyTargetArch,
}

/// Everything a caller can configure about one build.
pub struct Options {
  pub manifest_path: PathBuf,
  /// Explicit version; skips the version reader when non-empty.
  pub version: Option<String>,
  pub release: Option<String>,
  /// Package type keys, dispatched in order.
  pub package_types: Vec<String>,
  /// Root for the default filesystem reader.
  pub source_dir: PathBuf,
  /// Overrides the filesystem reader over `source_dir`.
  pub source_reader: Option<Box<dyn Reader + Send + Sync>>,
  pub version_reader: Option<Box<dyn VersionReader + Send + Sync>>,
  pub target_arch: String,
  /// External builder executable.
  pub builder_command: String,
  /// Deadline for the whole build, from validation through the builder run.
  pub build_timeout: Option<Duration>,
  pub cancel: CancelToken,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      manifest_path: PathBuf::new(),
      version: None,
      release: None,
      package_types: vec!["rpm".to_string()],
      source_dir: PathBuf::from("."),
      source_reader: None,
      version_reader: None,
      target_arch: DEFAULT_TARGET_ARCH.to_string(),
      builder_command: std::env::var(RPMBUILD_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_RPMBUILD.to_string()),
      build_timeout: None,
      cancel: CancelToken::new(),
    }
  }
}

impl Options {
  pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
    Self {
      manifest_path: manifest_path.into(),
      ..Default::default()
    }
  }

  pub fn validate(&self) -> Result<(), OptionsError> {
    if self.manifest_path.as_os_str().is_empty() {
      return Err(OptionsError::EmptyManifestPath);
    }
    if self.package_types.is_empty() {
      return Err(OptionsError::NoPackageTypes);
    }
    if self.target_arch.trim().is_empty() {
      return Err(OptionsError::EmptyTargetArch);
    }
    Ok(())
  }

  /// The explicit version, if one was given.
  pub fn explicit_version(&self) -> Option<&str> {
    self.version.as_deref().filter(|v| !v.is_empty())
  }

  /// The cancel token for this build, carrying the whole-build deadline if
  /// set. The clock starts when this is called.
  pub fn build_token(&self) -> CancelToken {
    match self.build_timeout {
      Some(timeout) => self.cancel.with_timeout(timeout),
      None => self.cancel.clone(),
    }
  }
}

impl std::fmt::Debug for Options {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Options")
      .field("manifest_path", &self.manifest_path)
      .field("version", &self.version)
      .field("release", &self.release)
      .field("package_types", &self.package_types)
      .field("source_dir", &self.source_dir)
      .field("source_reader", &self.source_reader.is_some())
      .field("version_reader", &self.version_reader.is_some())
      .field("target_arch", &self.target_arch)
      .field("builder_command", &self.builder_command)
      .field("build_timeout", &self.build_timeout)
      .finish_non_exhaustive()
  }
}
