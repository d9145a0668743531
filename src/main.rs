use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

mod cli;
mod config;
mod domain;
mod error;
mod infrastructure;
mod services;
mod ui;

use cli::Cli;
use config::Settings;
use services::ValidationService;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli).context("Invalid arguments")?;

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if settings.debug {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false) // Disable ANSI escape codes for cleaner output
        .init();

    settings.log_summary();
    if settings.integration_incomplete() {
        ui::notice_warning(
            "GitLab-related environment variables not set; merge request integration disabled",
            settings.format,
        );
    }

    let format = settings.format;
    let service = ValidationService::new(settings);

    let report = match service.run().await {
        Ok(report) => report,
        Err(e) => {
            ui::print_error(&format!("Error: {}", e));
            return Ok(ExitCode::FAILURE);
        }
    };

    ui::print_report(&report, format)?;

    if report.is_valid() {
        return Ok(ExitCode::SUCCESS);
    }

    service.publish(&report).await;
    Ok(ExitCode::FAILURE)
}
