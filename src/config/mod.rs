//! # Run Configuration
//!
//! A single immutable [`Settings`] value is built once at startup from
//! the CLI flags (and the environment variables clap reads for them),
//! then passed explicitly to the validation service.
//!
//! ## Environment
//!
//! - `GITLAB_URL`, `GITLAB_TOKEN`, `CI_PROJECT_ID`, `CI_MERGE_REQUEST_IID`:
//!   merge request to annotate with `--integration`
//! - `LOGGING` / `LOG_LEVEL`: tracing filter (see `main`)

pub mod gitlab;

pub use gitlab::GitLabSettings;

use std::path::PathBuf;
use tracing::debug;

use crate::cli::Cli;
use crate::domain::OrderingMode;
use crate::error::ConfigError;

/// How the validation report is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Settings for one validation run
#[derive(Debug, Clone)]
pub struct Settings {
    pub migration_dir: PathBuf,
    /// Ref to diff against; `None` compares the working tree
    pub compare_ref: Option<String>,
    pub debug: bool,
    pub diff_file: Option<PathBuf>,
    pub format: OutputFormat,
    pub ordering: OrderingMode,
    /// `--integration` was requested
    pub integration: bool,
    /// Present only when `--integration` is set and every value is known
    pub gitlab: Option<GitLabSettings>,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let format =
            OutputFormat::from_str(&cli.format).ok_or_else(|| ConfigError::InvalidValue {
                field: "format".to_string(),
                value: cli.format.clone(),
            })?;

        let ordering =
            OrderingMode::from_str(&cli.ordering).ok_or_else(|| ConfigError::InvalidValue {
                field: "ordering".to_string(),
                value: cli.ordering.clone(),
            })?;

        let gitlab = if cli.integration {
            GitLabSettings::from_parts(
                cli.gitlab_url.as_deref(),
                cli.gitlab_token.as_deref(),
                cli.project_id.as_deref(),
                cli.merge_request_iid.as_deref(),
            )
            .ok()
        } else {
            None
        };

        Ok(Self {
            migration_dir: cli.migration_dir.clone(),
            compare_ref: cli.branch.clone().filter(|b| !b.trim().is_empty()),
            debug: cli.debug,
            diff_file: cli.diff_file.clone(),
            format,
            ordering,
            integration: cli.integration,
            gitlab,
        })
    }

    /// `--integration` was requested without the values it needs
    pub fn integration_incomplete(&self) -> bool {
        self.integration && self.gitlab.is_none()
    }

    /// Log the effective settings
    pub fn log_summary(&self) {
        if self.debug {
            debug!("Debug mode enabled");
        }
        debug!("Migration directory: {}", self.migration_dir.display());
        debug!(
            "Compare branch: {}",
            self.compare_ref.as_deref().unwrap_or("<working tree>")
        );
        debug!("Ordering: {}", self.ordering.name());
        match &self.gitlab {
            Some(gitlab) => debug!("Integration enabled: {:?}", gitlab),
            None => debug!("Integration enabled: false"),
        }
    }
}
