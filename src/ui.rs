// Terminal UI utilities
// Human and JSON renderings of a validation report.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::OutputFormat;
use crate::services::ValidationReport;

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_red()
    );
    println!("{}", format!("║  {:<58}║", title).bright_red());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_red()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_info(message: &str) {
    println!("{}", format!("ℹ️  {}", message).bright_cyan());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).bright_yellow());
}

/// Notices go to stdout only in text mode; JSON output stays parseable.
pub fn notice_warning(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => print_warning(message),
        OutputFormat::Json => tracing::warn!("{}", message),
    }
}

/// Text rendering: each message followed by its indented path
pub fn render_text(report: &ValidationReport) -> String {
    let mut out = String::new();
    for violation in &report.violations {
        out.push_str(&format!(
            "{}\n\t{}\n\n",
            violation.message,
            violation.display_path()
        ));
    }
    out
}

pub fn print_report(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)
                .context("Failed to serialize validation report")?;
            println!("{}", json);
        }
        OutputFormat::Text if report.is_valid() => print_success("Validation successful"),
        OutputFormat::Text => {
            print_header("Validation errors");
            print!("{}", render_text(report));
            print_info(&format!(
                "{} of {} changes rejected",
                report.violations.len(),
                report.records_checked
            ));
        }
    }
    Ok(())
}
