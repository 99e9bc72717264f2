//! Implementation of the `baggr validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use baggr_lib::engine::validate_manifest;

use super::ManifestArg;
use crate::output::{OutputFormat, print_json, print_stat, print_success};

#[derive(Debug, Args)]
pub struct ValidateArgs {
  #[command(flatten)]
  manifest: ManifestArg,

  /// Directory manifest sources are read from
  #[arg(long, value_name = "DIR", default_value = ".")]
  source_dir: PathBuf,

  /// Output format
  #[arg(short, long, value_enum, default_value_t)]
  output: OutputFormat,
}

pub fn cmd_validate(args: ValidateArgs) -> Result<()> {
  let path = args.manifest.resolve()?;
  let manifest = validate_manifest(&path, &args.source_dir)
    .with_context(|| format!("Invalid manifest {}", path.display()))?;

  let components = manifest.all_components().count();
  let files = manifest.files().count();

  if args.output.is_json() {
    return print_json(&serde_json::json!({
      "valid": true,
      "name": manifest.component.name,
      "components": components,
      "files": files,
    }));
  }

  print_success(&format!("Manifest {} is valid", path.display()));
  print_stat("Package", &manifest.component.name);
  print_stat("Components", &components.to_string());
  print_stat("Files", &files.to_string());
  Ok(())
}
