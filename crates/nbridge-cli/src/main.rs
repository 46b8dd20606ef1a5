//! nbridge - Bridge declaration checker
//!
//! Usage:
//!   nbridge check <universe.json>                 Validate every bridge declaration
//!   nbridge check <universe.json> --config c.toml Override direction configurations
//!   nbridge check <universe.json> --format json   Machine-readable diagnostics

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::check::{CheckOptions, OutputFormat};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nbridge")]
#[command(about = "Resolve and validate cross-context bridge declarations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the bridge declarations of a type universe
    Check {
        /// Universe manifest (JSON)
        universe: PathBuf,

        /// Direction configuration overrides (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Diagnostic format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,

        /// Color output: auto, always, never
        #[arg(long)]
        color: Option<String>,

        /// Only check the declaration with this qualified or simple name
        #[arg(long)]
        decl: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NBRIDGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            universe,
            config,
            format,
            color,
            decl,
        } => commands::check::execute(
            CheckOptions {
                universe,
                config,
                format,
                decl,
            },
            color.as_deref(),
        ),
    }
}
