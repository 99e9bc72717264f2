//! Implementation of the `baggr build` command.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::warn;

use baggr_lib::build::Options;
use baggr_lib::engine::{Engine, ErrorKind};
use baggr_lib::version::SemverVersionReader;

use super::ManifestArg;
use crate::output::{OutputFormat, format_duration, print_error, print_json, print_stat, print_success};

#[derive(Debug, Args)]
pub struct BuildArgs {
  #[command(flatten)]
  manifest: ManifestArg,

  /// Package version; skips version computation
  #[arg(short = 'v', long)]
  version: Option<String>,

  /// Package release [default: manifest release, then 0]
  #[arg(short = 'r', long)]
  release: Option<String>,

  /// Package type to build; repeat for several
  #[arg(short = 't', long = "type", value_name = "TYPE")]
  package_types: Vec<String>,

  /// Target architecture passed to the builder
  #[arg(long, value_name = "ARCH")]
  target: Option<String>,

  /// Directory manifest sources are read from
  #[arg(long, value_name = "DIR", default_value = ".")]
  source_dir: PathBuf,

  /// Last released version; the next patch version is built
  #[arg(long, value_name = "VERSION")]
  last_version: Option<String>,

  /// Abort the whole build (staging and rpmbuild) after this many seconds
  #[arg(long, value_name = "SECS")]
  timeout: Option<u64>,

  /// Output format
  #[arg(short, long, value_enum, default_value_t)]
  output: OutputFormat,
}

#[derive(Serialize)]
struct BuildFailure<'a> {
  error: String,
  kind: ErrorKind,
  log: Option<&'a str>,
}

impl BuildArgs {
  fn into_options(self) -> Result<(Options, OutputFormat)> {
    let mut options = Options::new(self.manifest.resolve()?);
    options.version = self.version;
    options.release = self.release;
    if !self.package_types.is_empty() {
      options.package_types = self.package_types;
    }
    if let Some(target) = self.target {
      options.target_arch = target;
    }
    options.source_dir = self.source_dir;
    if let Some(last) = self.last_version {
      options.version_reader = Some(Box::new(SemverVersionReader::new(last)));
    }
    options.build_timeout = self.timeout.map(Duration::from_secs);
    Ok((options, self.output))
  }
}

/// Execute the build command.
///
/// Runs the engine on a fresh runtime. Ctrl-C cancels the build and kills a
/// running builder.
pub fn cmd_build(args: BuildArgs) -> Result<()> {
  let (options, output) = args.into_options()?;
  let started = Instant::now();

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let cancel = options.cancel.clone();
  let result = rt.block_on(async {
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received, cancelling build");
        cancel.cancel();
      }
    });
    Engine::new().build(&options).await
  });

  let report = match result {
    Ok(report) => report,
    Err(e) => {
      if output.is_json() {
        print_json(&BuildFailure {
          error: e.to_string(),
          kind: e.kind(),
          log: e.log(),
        })?;
      } else {
        if let Some(log) = e.log() {
          eprintln!("{}", log.trim_end());
        }
        print_error(&e.to_string());
      }
      return Err(e).context("Build failed");
    }
  };

  if output.is_json() {
    return print_json(&report);
  }

  print_success(&format!(
    "Built {} {}-{} in {}",
    report.name,
    report.version,
    report.release,
    format_duration(started.elapsed())
  ));
  for result in &report.results {
    for artifact in &result.artifacts {
      print_stat(&result.package_type, &artifact.path.display().to_string());
    }
  }

  Ok(())
}
