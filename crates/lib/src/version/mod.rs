//! Version resolution.
//!
//! A build's version is either explicit (from the options or the manifest) or
//! computed by asking a [`VersionReader`] for the last released version and
//! the one that follows it. The result is stored once in the
//! [`BuildSession`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::build::{BuildSession, Options};
use crate::consts::DEFAULT_RELEASE;
use crate::manifest::Manifest;

/// Errors raised while resolving a version.
#[derive(Debug, Error)]
pub enum VersionError {
  #[error("no version given and no version reader configured")]
  NoReader,

  #[error("invalid version {version}: {source}")]
  Parse { version: String, source: semver::Error },

  #[error("version {0} has no successor")]
  Overflow(String),

  #[error("version lookup failed: {0}")]
  Lookup(String),

  #[error("version already resolved to {0}")]
  AlreadyResolved(String),

  #[error("version not resolved")]
  Unresolved,
}

/// A package version and release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
  pub version: String,
  pub release: String,
}

impl Version {
  pub fn new(version: impl Into<String>, release: impl Into<String>) -> Self {
    Self {
      version: version.into(),
      release: release.into(),
    }
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.version, self.release)
  }
}

/// Source of previously released versions.
pub trait VersionReader {
  fn last_version(&self) -> Result<Version, VersionError>;

  fn compute_next_version(&self, last: &Version) -> Result<Version, VersionError>;
}

/// Version reader seeded with a known last version that bumps the patch.
///
/// A pre-release such as `1.2.3-rc.1` is followed by its release `1.2.3`.
#[derive(Debug, Clone)]
pub struct SemverVersionReader {
  last: Version,
}

impl SemverVersionReader {
  pub fn new(last: impl Into<String>) -> Self {
    Self {
      last: Version::new(last, DEFAULT_RELEASE),
    }
  }
}

impl VersionReader for SemverVersionReader {
  fn last_version(&self) -> Result<Version, VersionError> {
    Ok(self.last.clone())
  }

  fn compute_next_version(&self, last: &Version) -> Result<Version, VersionError> {
    let (prefix, bare) = match last.version.strip_prefix('v') {
      Some(rest) => ("v", rest),
      None => ("", last.version.as_str()),
    };

    let parsed = semver::Version::parse(bare).map_err(|e| VersionError::Parse {
      version: last.version.clone(),
      source: e,
    })?;
    let patch = if parsed.pre.is_empty() {
      parsed
        .patch
        .checked_add(1)
        .ok_or_else(|| VersionError::Overflow(last.version.clone()))?
    } else {
      parsed.patch
    };
    let next = semver::Version::new(parsed.major, parsed.minor, patch);

    Ok(Version::new(format!("{}{}", prefix, next), DEFAULT_RELEASE))
  }
}

/// Resolve the build version into `session`.
///
/// An explicit version in the options wins, then one in the manifest;
/// otherwise the configured reader computes the next version. The release
/// comes from the options, then the manifest, then the reader, then
/// [`DEFAULT_RELEASE`].
pub fn ensure_version(manifest: &Manifest, options: &Options, session: &mut BuildSession) -> Result<(), VersionError> {
  let explicit = options
    .explicit_version()
    .or_else(|| Some(manifest.version.as_str()).filter(|v| !v.is_empty()));

  let (version, computed_release) = match explicit {
    Some(v) => (v.to_string(), None),
    None => {
      let reader = options.version_reader.as_ref().ok_or(VersionError::NoReader)?;
      let last = reader.last_version()?;
      let next = reader.compute_next_version(&last)?;
      info!(last = %last, next = %next, "computed next version");
      (next.version, Some(next.release))
    }
  };

  let release = [options.release.clone(), Some(manifest.release.clone()), computed_release]
    .into_iter()
    .flatten()
    .find(|r| !r.is_empty())
    .unwrap_or_else(|| DEFAULT_RELEASE.to_string());

  let resolved = Version::new(version, release);
  info!(version = %resolved.version, release = %resolved.release, "resolved version");
  session.set_version(resolved)
}
