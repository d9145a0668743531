//! CLI definitions for migration-guard
//!
//! This module contains the CLI argument parsing structure using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::gitlab::{
    CI_MERGE_REQUEST_IID_ENV, CI_PROJECT_ID_ENV, GITLAB_TOKEN_ENV, GITLAB_URL_ENV,
};

#[derive(Parser, Debug)]
#[command(
    name = "migration-guard",
    version,
    about = "Keeps versioned migration files append-only",
    long_about = "Inspects `git diff --name-status` for the migration directory and fails when an\n\
                  applied migration (V<digits>__*) is modified, removed, renamed, or when a new\n\
                  migration is not ordered last."
)]
pub struct Cli {
    /// Migration directory to validate
    #[arg(long, default_value = ".")]
    pub migration_dir: PathBuf,

    /// Branch or ref to compare against (default: working tree)
    #[arg(long)]
    pub branch: Option<String>,

    /// Enable debug logging
    #[arg(short, long, visible_alias = "verbose")]
    pub debug: bool,

    /// Post violations as discussions on the GitLab merge request
    #[arg(long)]
    pub integration: bool,

    /// Read the name-status report from a file instead of git (`-` for stdin)
    #[arg(long)]
    pub diff_file: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Migration ordering: lexical (byte-wise path order) or version (numeric V<digits>)
    #[arg(long, default_value = "lexical")]
    pub ordering: String,

    /// GitLab API root (e.g. https://gitlab.example.com/api)
    #[arg(long, env = GITLAB_URL_ENV, hide_env_values = true)]
    pub gitlab_url: Option<String>,

    /// GitLab access token
    #[arg(long, env = GITLAB_TOKEN_ENV, hide_env_values = true)]
    pub gitlab_token: Option<String>,

    /// GitLab project id or path
    #[arg(long, env = CI_PROJECT_ID_ENV)]
    pub project_id: Option<String>,

    /// Merge request IID within the project
    #[arg(long, env = CI_MERGE_REQUEST_IID_ENV)]
    pub merge_request_iid: Option<String>,
}
