//! Lamina CLI - static prerender and bundler-configuration tool.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "lamina")]
#[command(about = "Static prerender and bundler-configuration tool")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to lamina.toml config file
    #[arg(short, long, default_value = "lamina.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Prerender the site into the output directory
    Build {
        /// Output directory (defaults to config or "build")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat any unmatched render failure as fatal
        #[arg(long)]
        strict: bool,

        /// Write a JSON build report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Validate entries, error policy, aliases, and bundle policy without rendering
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Build {
            output,
            strict,
            report,
        } => {
            commands::build::run(&cli.config, output, strict, report).await?;
        }
        Commands::Check => {
            commands::check::run(&cli.config)?;
        }
    }

    Ok(())
}
