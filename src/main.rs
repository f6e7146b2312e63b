// Meli ETL - Marketplace listings to analytical warehouse pipeline
// Copyright (c) 2025 Meli ETL Contributors
// Licensed under the MIT License

use clap::Parser;
use meli_etl::cli::Cli;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let exit_code = match cli.execute().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            1
        }
    };

    process::exit(exit_code);
}
