//! Package manifest model.
//!
//! A manifest describes one package build: the main component's metadata and
//! files, optional sub-components, and the URL/version/release to stamp on the
//! produced packages. Manifests are decoded from YAML.

mod types;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub use types::*;

/// Errors that can occur while loading or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to decode manifest: {0}")]
  Decode(#[from] serde_yaml::Error),

  #[error("absolute source paths are not supported: {}", paths.join(", "))]
  AbsoluteSources { paths: Vec<String> },
}

impl Manifest {
  /// Read and decode a manifest file.
  pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
    let content = fs::read_to_string(path).map_err(|e| ManifestError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;
    let manifest = Self::from_yaml(&content)?;
    info!(path = %path.display(), components = manifest.components.len() + 1, "parsed manifest");
    Ok(manifest)
  }

  /// Decode a manifest from YAML text.
  pub fn from_yaml(content: &str) -> Result<Self, ManifestError> {
    Ok(serde_yaml::from_str(content)?)
  }

  /// Fail with every absolute source path found in the manifest.
  ///
  /// The directory sentinel is not a path and is never reported.
  pub fn reject_absolute_sources(&self) -> Result<(), ManifestError> {
    let paths: Vec<String> = self
      .files()
      .filter(|f| !f.is_dir_sentinel() && f.source.starts_with('/'))
      .map(|f| f.source.clone())
      .collect();

    if paths.is_empty() {
      Ok(())
    } else {
      Err(ManifestError::AbsoluteSources { paths })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = r#"
name: test
license: Apache-2.0
summary: Test project
description: Empty project to test
requires:
  - comp1
  - comp2
url: https://example.com/test
release: "3"
files:
  - source: "%DIR%"
    destination: /testdir
  - source: bin/tool
    destination: /usr/bin/tool
    mode: "0755"
    uid: root
    gid: root
components:
  - name: test-docs
    license: Apache-2.0
    summary: Docs
    nodeps: true
    files:
      - source: docs
        destination: /usr/share/doc/test
"#;

  #[test]
  fn decodes_inline_top_level_component() {
    let manifest = Manifest::from_yaml(SAMPLE).unwrap();

    assert_eq!(manifest.component.name, "test");
    assert_eq!(manifest.component.license, "Apache-2.0");
    assert_eq!(manifest.component.requires, vec!["comp1", "comp2"]);
    assert_eq!(manifest.component.files.len(), 2);
    assert_eq!(manifest.url, "https://example.com/test");
    assert_eq!(manifest.version, "");
    assert_eq!(manifest.release, "3");
    assert_eq!(manifest.components.len(), 1);
    assert!(manifest.components[0].no_deps);
    assert!(!manifest.component.no_deps);
  }

  #[test]
  fn decodes_file_attributes_as_strings() {
    let manifest = Manifest::from_yaml(SAMPLE).unwrap();
    let tool = &manifest.component.files[1];

    assert_eq!(tool.mode, "0755");
    assert_eq!(tool.uid, "root");
    assert_eq!(tool.gid, "root");
  }

  #[test]
  fn decode_error_is_reported() {
    let result = Manifest::from_yaml("files: {not: [a list");
    assert!(matches!(result, Err(ManifestError::Decode(_))));
  }

  #[test]
  fn from_file_missing_is_read_error() {
    let result = Manifest::from_file(Path::new("/definitely/not/here.yaml"));
    assert!(matches!(result, Err(ManifestError::Read { .. })));
  }

  #[test]
  fn reject_absolute_sources_reports_every_path() {
    let manifest = Manifest::from_yaml(
      r#"
name: abs
files:
  - source: /etc/one
  - source: relative
  - source: "%DIR%"
    destination: /var/lib/abs
components:
  - name: abs-extra
    files:
      - source: /etc/two
"#,
    )
    .unwrap();

    match manifest.reject_absolute_sources() {
      Err(ManifestError::AbsoluteSources { paths }) => {
        assert_eq!(paths, vec!["/etc/one".to_string(), "/etc/two".to_string()]);
      }
      other => panic!("expected AbsoluteSources, got {:?}", other),
    }
  }

  #[test]
  fn relative_sources_are_accepted() {
    let manifest = Manifest::from_yaml(SAMPLE).unwrap();
    assert!(manifest.reject_absolute_sources().is_ok());
  }
}
