//! State scoped to one build call.

use super::CancelToken;
use crate::version::{Version, VersionError};

/// Holds the resolved version for a single build.
///
/// Created fresh by the engine for every build and passed by reference down
/// to the workers. The version can be set once and is read-only afterwards.
#[derive(Debug, Default)]
pub struct BuildSession {
  version: Option<Version>,
  cancel: CancelToken,
}

impl BuildSession {
  pub fn new(cancel: CancelToken) -> Self {
    Self { version: None, cancel }
  }

  pub fn set_version(&mut self, version: Version) -> Result<(), VersionError> {
    if let Some(existing) = &self.version {
      return Err(VersionError::AlreadyResolved(existing.to_string()));
    }
    self.version = Some(version);
    Ok(())
  }

  pub fn version(&self) -> Result<&Version, VersionError> {
    self.version.as_ref().ok_or(VersionError::Unresolved)
  }

  pub fn cancel(&self) -> &CancelToken {
    &self.cancel
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn version_is_set_once() {
    let mut session = BuildSession::default();
    assert!(matches!(session.version(), Err(VersionError::Unresolved)));

    session.set_version(Version::new("1.0.0", "1")).unwrap();
    let again = session.set_version(Version::new("2.0.0", "1"));

    assert!(matches!(again, Err(VersionError::AlreadyResolved(v)) if v == "1.0.0-1"));
    assert_eq!(session.version().unwrap().version, "1.0.0");
  }
}
