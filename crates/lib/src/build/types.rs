use std::path::PathBuf;

use serde::Serialize;

/// A package file produced by the external builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
  pub path: PathBuf,
}

/// Outcome of building one package type.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildResult {
  pub package_type: String,
  pub artifacts: Vec<Artifact>,
  /// Full captured builder output.
  pub log: String,
  /// Failure reported inside the builder output, if any.
  pub error: Option<String>,
}

/// Outcome of a whole build across every requested package type.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub name: String,
  pub version: String,
  pub release: String,
  pub results: Vec<BuildResult>,
}

impl BuildReport {
  pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
    self.results.iter().flat_map(|r| r.artifacts.iter())
  }
}
