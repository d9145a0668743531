//! GitLab review-session settings.

use std::fmt;

use crate::error::ConfigError;

pub const GITLAB_URL_ENV: &str = "GITLAB_URL";
pub const GITLAB_TOKEN_ENV: &str = "GITLAB_TOKEN";
pub const CI_PROJECT_ID_ENV: &str = "CI_PROJECT_ID";
pub const CI_MERGE_REQUEST_IID_ENV: &str = "CI_MERGE_REQUEST_IID";

/// Identifies the merge request to annotate and how to reach it
#[derive(Clone, PartialEq, Eq)]
pub struct GitLabSettings {
    /// API root, e.g. `https://gitlab.example.com/api`
    pub url: String,
    pub token: String,
    pub project_id: String,
    pub merge_request_iid: String,
}

// Keeps the token out of debug logs
impl fmt::Debug for GitLabSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabSettings")
            .field("url", &self.url)
            .field("token_len", &self.token.len())
            .field("project_id", &self.project_id)
            .field("merge_request_iid", &self.merge_request_iid)
            .finish()
    }
}

impl GitLabSettings {
    /// Assemble settings, failing on the first missing or empty value.
    pub fn from_parts(
        url: Option<&str>,
        token: Option<&str>,
        project_id: Option<&str>,
        merge_request_iid: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            url: required(GITLAB_URL_ENV, url)?,
            token: required(GITLAB_TOKEN_ENV, token)?,
            project_id: required(CI_PROJECT_ID_ENV, project_id)?,
            merge_request_iid: required(CI_MERGE_REQUEST_IID_ENV, merge_request_iid)?,
        })
    }
}

fn required(field: &str, value: Option<&str>) -> Result<String, ConfigError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingField {
            field: field.to_string(),
        })
}
