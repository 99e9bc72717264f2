mod cmd;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// baggr - Build native packages from a declarative manifest
#[derive(Parser)]
#[command(name = "baggr")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Log verbosity; RUST_LOG takes precedence when set
  #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
  log_level: LogLevel,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
  Trace,
  Debug,
  Info,
  Warn,
  Error,
}

impl LogLevel {
  fn as_filter(self) -> &'static str {
    match self {
      LogLevel::Trace => "trace",
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warn => "warn",
      LogLevel::Error => "error",
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Build packages from a manifest
  Build(cmd::BuildArgs),

  /// Check a manifest and its sources without building
  Validate(cmd::ValidateArgs),

  /// Show version and supported package types
  Info {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter()));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Build(args) => cmd::cmd_build(args),
    Commands::Validate(args) => cmd::cmd_validate(args),
    Commands::Info { output } => cmd::cmd_info(output),
  }
}
