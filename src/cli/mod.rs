//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the pipeline using clap.
//! Invoking the binary without a subcommand performs a run.

pub mod commands;

use clap::{Parser, Subcommand};

/// Meli ETL - marketplace listings to analytical warehouse pipeline
#[derive(Parser, Debug)]
#[command(name = "meli-etl")]
#[command(version, about, long_about = None)]
#[command(author = "Meli ETL Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "config/pipeline.toml",
        env = "MELI_ETL_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MELI_ETL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract listings, normalize them and append them to the warehouse
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

impl Cli {
    /// Execute the selected command and return the process exit code
    pub async fn execute(&self) -> anyhow::Result<i32> {
        match &self.command {
            Some(Commands::Run(args)) => args.execute(&self.config, self.log_level.as_deref()).await,
            Some(Commands::ValidateConfig(args)) => args.execute(&self.config).await,
            None => {
                commands::run::RunArgs::default()
                    .execute(&self.config, self.log_level.as_deref())
                    .await
            }
        }
    }
}
