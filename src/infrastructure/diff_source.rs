//! Where the name-status change report comes from

use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

use super::git::GitClient;
use crate::domain::{parse_name_status, parse_name_status_z, ChangeRecord};
use crate::error::GuardError;

/// Source of the raw change-status report
#[derive(Debug)]
pub enum DiffSource {
    /// `git diff --name-status` of the migration directory
    Git {
        client: GitClient,
        compare_ref: Option<String>,
    },
    /// A report previously written to a file
    File(PathBuf),
    /// A report piped on standard input
    Stdin,
}

/// Parsed change records and the migration root in the same base as
/// their paths
#[derive(Debug)]
pub struct ChangeReport {
    pub records: Vec<ChangeRecord>,
    pub migration_root: PathBuf,
}

impl DiffSource {
    /// Choose a source from the `--diff-file` argument: `-` means stdin,
    /// any other value a file, and no value the git CLI.
    pub fn select(diff_file: Option<PathBuf>, compare_ref: Option<String>) -> Self {
        match diff_file {
            Some(path) if path.as_os_str() == "-" => Self::Stdin,
            Some(path) => Self::File(path),
            None => Self::Git {
                client: GitClient::new(),
                compare_ref,
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Git { compare_ref, .. } => match compare_ref {
                Some(reference) => format!("git diff against {}", reference),
                None => "git diff of the working tree".to_string(),
            },
            Self::File(path) => path.display().to_string(),
            Self::Stdin => "standard input".to_string(),
        }
    }

    /// Read and parse the report for `migration_dir`.
    ///
    /// Git reports paths relative to the repository top level, so the
    /// root is re-expressed against it. File and stdin reports are taken
    /// to use the same base as `migration_dir`.
    pub async fn read(&self, migration_dir: &Path) -> Result<ChangeReport, GuardError> {
        match self {
            Self::Git {
                client,
                compare_ref,
            } => {
                let toplevel = client.toplevel(migration_dir).await?;
                let root = repository_relative(&toplevel, migration_dir).await?;
                let output = client
                    .diff_name_status(&toplevel, compare_ref.as_deref(), &root)
                    .await?;
                Ok(ChangeReport {
                    records: parse_name_status_z(&output),
                    migration_root: root,
                })
            }
            Self::File(path) => {
                let report = tokio::fs::read_to_string(path).await.map_err(|e| {
                    GuardError::DiffReadFailed {
                        source_name: self.describe(),
                        message: e.to_string(),
                    }
                })?;
                Ok(Self::text_report(&report, migration_dir))
            }
            Self::Stdin => {
                let mut report = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut report)
                    .await
                    .map_err(|e| GuardError::DiffReadFailed {
                        source_name: self.describe(),
                        message: e.to_string(),
                    })?;
                Ok(Self::text_report(&report, migration_dir))
            }
        }
    }

    fn text_report(report: &str, migration_dir: &Path) -> ChangeReport {
        ChangeReport {
            records: parse_name_status(report),
            migration_root: migration_dir.to_path_buf(),
        }
    }
}

/// `dir` relative to the repository `toplevel`, `.` for the top level itself
async fn repository_relative(toplevel: &Path, dir: &Path) -> Result<PathBuf, GuardError> {
    let resolve = |path: &Path, e: std::io::Error| GuardError::RepositoryPath {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let toplevel = tokio::fs::canonicalize(toplevel)
        .await
        .map_err(|e| resolve(toplevel, e))?;
    let canonical = tokio::fs::canonicalize(dir)
        .await
        .map_err(|e| resolve(dir, e))?;

    let relative = canonical
        .strip_prefix(&toplevel)
        .map_err(|_| GuardError::RepositoryPath {
            path: dir.to_path_buf(),
            message: format!("not under {}", toplevel.display()),
        })?;

    if relative.as_os_str().is_empty() {
        Ok(PathBuf::from("."))
    } else {
        Ok(relative.to_path_buf())
    }
}
