//! RPM package worker.
//!
//! Building RPMs takes four steps:
//!
//! 1. stage every component's files into a fresh build root
//! 2. render a spec file describing the packages
//! 3. run `rpmbuild` against the spec and the build root
//! 4. collect the packages it announces
//!
//! # Submodules
//!
//! - [`spec`] - Spec file rendering
//! - [`rpmbuild`] - `rpmbuild` invocation and log parsing

pub mod rpmbuild;
pub mod spec;

use thiserror::Error;
use tracing::info;

use crate::build::{BuildResult, BuildSession, Options};
use crate::exec::ExecError;
use crate::manifest::Manifest;
use crate::source::{DirWriter, Reader, SourceError, Writer};
use crate::template::TemplateError;
use crate::version::VersionError;

/// Errors raised while building RPM packages.
#[derive(Debug, Error)]
pub enum RpmError {
  #[error("unable to build spec, no files defined in top level component")]
  NoFiles,

  #[error(transparent)]
  Version(#[from] VersionError),

  #[error("failed to render spec: {0}")]
  Template(#[from] TemplateError),

  #[error("failed to write spec file: {source}")]
  WriteSpec { source: std::io::Error },

  #[error("failed to create build root: {source}")]
  BuildRoot { source: std::io::Error },

  #[error("failed to stage files of component {component:?}: {source}")]
  Stage { component: String, source: SourceError },

  #[error("failed to run rpmbuild: {0}")]
  Exec(#[from] ExecError),

  #[error("rpmbuild failed (exit code {}): {error}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
  BuilderFailed { code: Option<i32>, error: String, log: String },
}

impl RpmError {
  /// The captured builder log, for failures that have one.
  pub fn log(&self) -> Option<&str> {
    match self {
      RpmError::BuilderFailed { log, .. } => Some(log),
      _ => None,
    }
  }
}

/// Builds RPM packages with the external `rpmbuild` tool.
#[derive(Debug, Clone, Default)]
pub struct RpmWorker;

impl RpmWorker {
  pub fn new() -> Self {
    Self
  }

  pub async fn build_packages(
    &self,
    manifest: &Manifest,
    options: &Options,
    reader: &dyn Reader,
    session: &BuildSession,
  ) -> Result<BuildResult, RpmError> {
    let version = session.version()?;

    let buildroot = tempfile::Builder::new()
      .prefix("baggr-rpmbuildroot-")
      .tempdir()
      .map_err(|e| RpmError::BuildRoot { source: e })?;
    info!(buildroot = %buildroot.path().display(), "created build root");

    let writer = DirWriter::new(buildroot.path());
    for component in manifest.all_components() {
      writer
        .copy_paths(reader, &component.files, session.cancel())
        .map_err(|e| RpmError::Stage {
          component: component.name.clone(),
          source: e,
        })?;
    }

    let text = spec::render_spec(manifest, version, writer.path())?;
    let spec_path = spec::write_spec(&text)?;

    let result = rpmbuild::run_rpmbuild(
      &options.builder_command,
      &spec_path,
      writer.path(),
      &options.target_arch,
      session.cancel(),
    )
    .await?;

    if let Some(error) = &result.error {
      return Err(RpmError::BuilderFailed {
        code: Some(0),
        error: error.clone(),
        log: result.log,
      });
    }

    for artifact in &result.artifacts {
      info!(path = %artifact.path.display(), "built package");
    }
    Ok(result)
  }
}
