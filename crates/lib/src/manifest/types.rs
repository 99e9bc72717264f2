//! Manifest types for baggr.
//!
//! The top-level component's fields are inlined into the manifest document,
//! so a minimal manifest reads:
//!
//! ```yaml
//! name: hello
//! license: MIT
//! summary: Says hello
//! files:
//!   - source: build/hello
//!     destination: /usr/bin/hello
//!     mode: "0755"
//! ```
//!
//! Cloning a [`Manifest`] yields a fully independent copy; descriptor
//! rendering works on such a copy so defaults never leak back into the parsed
//! manifest.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::{DEFAULT_ATTR, DIR_SENTINEL};

/// The complete description of one package build.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
  /// Main component, inlined at the top level of the document.
  #[serde(flatten)]
  pub component: Component,

  #[serde(default)]
  pub url: String,

  #[serde(default, deserialize_with = "scalar_string")]
  pub version: String,

  #[serde(default, deserialize_with = "scalar_string")]
  pub release: String,

  /// Sub-components, each producing its own sub-package.
  #[serde(default)]
  pub components: Vec<Component>,
}

/// A named unit contributing files and metadata to the build.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
  #[serde(default)]
  pub name: String,

  #[serde(default)]
  pub license: String,

  #[serde(default)]
  pub summary: String,

  #[serde(default)]
  pub description: String,

  /// Disable automatic dependency and provides generation.
  #[serde(default, rename = "nodeps", alias = "no_deps")]
  pub no_deps: bool,

  #[serde(default)]
  pub requires: Vec<String>,

  #[serde(default)]
  pub files: Vec<FileEntry>,
}

/// One source-to-destination mapping.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
  /// Path on the source filesystem, or [`DIR_SENTINEL`].
  #[serde(default)]
  pub source: String,

  /// Install path; empty means "same as source".
  #[serde(default)]
  pub destination: String,

  #[serde(default, deserialize_with = "scalar_string")]
  pub mode: String,

  #[serde(default, deserialize_with = "scalar_string")]
  pub uid: String,

  #[serde(default, deserialize_with = "scalar_string")]
  pub gid: String,
}

impl Manifest {
  /// The main component followed by every sub-component, in manifest order.
  pub fn all_components(&self) -> impl Iterator<Item = &Component> {
    std::iter::once(&self.component).chain(self.components.iter())
  }

  /// Every file entry of every component, in manifest order.
  pub fn files(&self) -> impl Iterator<Item = &FileEntry> {
    self.all_components().flat_map(|c| c.files.iter())
  }

  /// Fill empty mode/uid/gid on every file with [`DEFAULT_ATTR`].
  pub fn ensure_defaults(&mut self) {
    self.component.ensure_defaults();
    for component in &mut self.components {
      component.ensure_defaults();
    }
  }
}

impl Component {
  /// Requirements as a single comma-separated list.
  pub fn requires_string(&self) -> String {
    self.requires.join(", ")
  }

  pub fn ensure_defaults(&mut self) {
    for file in &mut self.files {
      file.ensure_defaults();
    }
  }
}

impl FileEntry {
  pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      destination: destination.into(),
      ..Default::default()
    }
  }

  /// Returns true if this entry only asks for an empty directory.
  pub fn is_dir_sentinel(&self) -> bool {
    self.source == DIR_SENTINEL
  }

  /// The install path: the destination, or the source when none is set.
  pub fn target(&self) -> &str {
    if self.destination.is_empty() {
      &self.source
    } else {
      &self.destination
    }
  }

  pub fn ensure_defaults(&mut self) {
    for attr in [&mut self.mode, &mut self.uid, &mut self.gid] {
      if attr.is_empty() {
        *attr = DEFAULT_ATTR.to_string();
      }
    }
  }
}

/// Accept any YAML scalar where a string is expected.
///
/// Lets manifests write `release: 1` or `mode: 644` without quoting. Floats
/// are refused: `version: 1.10` would otherwise come back as `"1.1"`.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
  }

  Ok(match Option::<Scalar>::deserialize(deserializer)? {
    Some(Scalar::Str(s)) => s,
    Some(Scalar::Int(i)) => i.to_string(),
    Some(Scalar::Float(f)) => {
      return Err(D::Error::custom(format!(
        "unquoted number {f} would lose its original text; quote it as a string"
      )));
    }
    Some(Scalar::Bool(b)) => b.to_string(),
    None => String::new(),
  })
}
