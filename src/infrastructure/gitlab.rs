//! GitLab client for annotating merge requests
//!
//! Posts one discussion per violation on the merge request under review,
//! anchored to the offending file. Used only with `--integration`.
//!
//! ## Configuration
//!
//! ```bash
//! export GITLAB_URL=https://gitlab.example.com/api
//! export GITLAB_TOKEN=glpat-...
//! export CI_PROJECT_ID=42
//! export CI_MERGE_REQUEST_IID=7
//! ```
//!
//! `GITLAB_URL` is the API root without the `/v4` suffix.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::GitLabSettings;
use crate::domain::Violation;
use crate::error::ReviewError;

/// Header GitLab reads personal/project access tokens from
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// GitLab REST client scoped to one merge request
pub struct GitLabClient {
    client: Client,
    settings: GitLabSettings,
}

/// Subset of the merge request resource we need
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    #[serde(default)]
    pub diff_refs: Option<DiffRefs>,
}

/// Commits a diff position is expressed against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRefs {
    pub base_sha: String,
    pub head_sha: String,
    pub start_sha: String,
}

/// Request to open a discussion on a merge request
#[derive(Debug, Clone, Serialize)]
pub struct CreateDiscussionRequest {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<DiscussionPosition>,
}

/// File-level position of a discussion in the merge request diff
#[derive(Debug, Clone, Serialize)]
pub struct DiscussionPosition {
    pub position_type: String,
    pub base_sha: String,
    pub head_sha: String,
    pub start_sha: String,
    pub new_path: String,
    pub old_path: String,
    pub old_line: Option<u32>,
    pub new_line: Option<u32>,
    pub line_range: serde_json::Map<String, serde_json::Value>,
    pub ignore_whitespace_change: bool,
}

impl CreateDiscussionRequest {
    /// Build the discussion for a violation, anchored to its file when
    /// it has one.
    pub fn for_violation(violation: &Violation, refs: &DiffRefs) -> Self {
        let position = violation.has_location().then(|| DiscussionPosition {
            position_type: "file".to_string(),
            base_sha: refs.base_sha.clone(),
            head_sha: refs.head_sha.clone(),
            start_sha: refs.start_sha.clone(),
            new_path: violation.display_path().to_string(),
            old_path: if violation.old_path.is_empty() {
                violation.display_path().to_string()
            } else {
                violation.old_path.clone()
            },
            old_line: None,
            new_line: None,
            line_range: serde_json::Map::new(),
            ignore_whitespace_change: false,
        });

        Self {
            body: violation.markdown(),
            position,
        }
    }
}

impl GitLabClient {
    pub fn new(settings: GitLabSettings) -> Result<Self, ReviewError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ReviewError::Request {
                url: settings.url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { client, settings })
    }

    /// `{url}/v4/projects/{id}/merge_requests/{iid}`
    pub fn merge_request_url(&self) -> String {
        format!(
            "{}/v4/projects/{}/merge_requests/{}",
            self.settings.url.trim_end_matches('/'),
            urlencoding::encode(&self.settings.project_id),
            urlencoding::encode(&self.settings.merge_request_iid),
        )
    }

    pub fn discussions_url(&self) -> String {
        format!("{}/discussions", self.merge_request_url())
    }

    /// Fetch the merge request's diff refs
    pub async fn diff_refs(&self) -> Result<DiffRefs, ReviewError> {
        let url = self.merge_request_url();
        debug!("Fetching merge request info from {}", url);

        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.settings.token)
            .send()
            .await
            .map_err(|e| ReviewError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(ReviewError::UnexpectedStatus {
                url,
                status: response.status().as_u16(),
            });
        }

        let merge_request: MergeRequest =
            response.json().await.map_err(|e| ReviewError::Request {
                url: url.clone(),
                message: format!("failed to decode merge request: {}", e),
            })?;

        merge_request.diff_refs.ok_or_else(|| ReviewError::MissingField {
            field: "diff_refs".to_string(),
        })
    }

    /// Open a discussion on the merge request
    pub async fn post_discussion(&self, request: &CreateDiscussionRequest) -> Result<(), ReviewError> {
        let url = self.discussions_url();

        let response = self
            .client
            .post(&url)
            .header(TOKEN_HEADER, &self.settings.token)
            .json(request)
            .send()
            .await
            .map_err(|e| ReviewError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if response.status() != StatusCode::CREATED {
            return Err(ReviewError::UnexpectedStatus {
                url,
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

/// Reports violations as merge request discussions
pub struct GitLabReporter {
    client: GitLabClient,
}

impl GitLabReporter {
    pub fn new(settings: GitLabSettings) -> Result<Self, ReviewError> {
        Ok(Self {
            client: GitLabClient::new(settings)?,
        })
    }

    /// Post every violation; returns how many discussions were created.
    ///
    /// A failed post does not stop the remaining ones.
    pub async fn report(&self, violations: &[Violation]) -> Result<usize, ReviewError> {
        if violations.is_empty() {
            return Ok(0);
        }

        let refs = self.client.diff_refs().await?;

        let mut posted = 0;
        for violation in violations {
            let request = CreateDiscussionRequest::for_violation(violation, &refs);
            match self.client.post_discussion(&request).await {
                Ok(()) => {
                    posted += 1;
                    debug!(path = %violation.display_path(), "Posted merge request discussion");
                }
                Err(e) => {
                    warn!(path = %violation.display_path(), error = %e, "Failed to post merge request discussion");
                }
            }
        }

        if posted < violations.len() {
            return Err(ReviewError::PartialFailure {
                failed: violations.len() - posted,
                total: violations.len(),
            });
        }

        info!("Posted {} discussions to merge request", posted);
        Ok(posted)
    }
}
