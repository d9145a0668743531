//! Centralized error types for migration-guard
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.
//!
//! Rule violations are NOT errors: they are collected as
//! [`crate::domain::Violation`] values and decide the exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a validation run
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Migration directory does not exist: {}", path.display())]
    MigrationDirMissing { path: PathBuf },

    #[error("Failed to scan migration directory {}: {message}", path.display())]
    ScanFailed { path: PathBuf, message: String },

    #[error("Failed to read diff report from {source_name}: {message}")]
    DiffReadFailed {
        source_name: String,
        message: String,
    },

    #[error("Cannot locate {} in its repository: {message}", path.display())]
    RepositoryPath { path: PathBuf, message: String },

    #[error("Git error: {0}")]
    Git(#[from] GitError),
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to execute git: {0}")]
    SpawnFailed(String),

    #[error("Git command failed: {command}: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Git output is not valid UTF-8")]
    InvalidOutput,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required configuration missing: {field}")]
    MissingField { field: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Review system (GitLab) errors
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("HTTP request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Merge request response is missing {field}")]
    MissingField { field: String },

    #[error("{failed} of {total} discussions could not be posted")]
    PartialFailure { failed: usize, total: usize },
}
