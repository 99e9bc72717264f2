mod build;
mod info;
mod validate;

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;

pub use build::{BuildArgs, cmd_build};
pub use info::cmd_info;
pub use validate::{ValidateArgs, cmd_validate};

/// Manifest location, given either positionally or with `--manifest`.
#[derive(Debug, Args)]
pub struct ManifestArg {
  /// Path to the manifest file
  #[arg(value_name = "MANIFEST", conflicts_with = "manifest_flag")]
  manifest: Option<PathBuf>,

  /// Path to the manifest file
  #[arg(short = 'm', long = "manifest", value_name = "PATH")]
  manifest_flag: Option<PathBuf>,
}

impl ManifestArg {
  pub fn resolve(self) -> Result<PathBuf> {
    match (self.manifest, self.manifest_flag) {
      (Some(_), Some(_)) => bail!("manifest path given both as an argument and with --manifest"),
      (Some(path), None) | (None, Some(path)) => Ok(path),
      (None, None) => bail!("no manifest given; pass MANIFEST or --manifest <PATH>"),
    }
  }
}
