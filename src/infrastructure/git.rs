//! Git operations
//!
//! Produces the name-status change report for the migration directory.
//! Commands run from the repository top level so reported paths are
//! relative to it, wherever the tool itself was started.

use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::GitError;

/// Client for git operations
#[derive(Debug, Default)]
pub struct GitClient;

impl GitClient {
    pub fn new() -> Self {
        Self
    }

    /// Arguments for `git diff --name-status -z` restricted to `pathspec`.
    ///
    /// `pathspec` is relative to the repository top level.
    pub fn diff_args(compare_ref: Option<&str>, pathspec: &Path) -> Vec<String> {
        let mut args = vec![
            "diff".to_string(),
            "--name-status".to_string(),
            "-z".to_string(),
        ];

        if let Some(reference) = compare_ref.filter(|r| !r.is_empty()) {
            args.push(reference.to_string());
        }

        args.push("--".to_string());
        args.push(pathspec.to_string_lossy().into_owned());
        args
    }

    /// Top level of the repository containing `dir`
    pub async fn toplevel(&self, dir: &Path) -> Result<PathBuf, GitError> {
        let args = vec!["rev-parse".to_string(), "--show-toplevel".to_string()];
        let output = self.run(dir, &args).await?;
        Ok(PathBuf::from(output.trim_end_matches(['\n', '\r'])))
    }

    /// Run `git diff --name-status -z` in `repo` against `compare_ref`
    /// (or the index when `None`) for the given path.
    pub async fn diff_name_status(
        &self,
        repo: &Path,
        compare_ref: Option<&str>,
        pathspec: &Path,
    ) -> Result<String, GitError> {
        let args = Self::diff_args(compare_ref, pathspec);
        self.run(repo, &args).await
    }

    async fn run(&self, dir: &Path, args: &[String]) -> Result<String, GitError> {
        let command_line = format!("git {}", args.join(" "));
        debug!(dir = %dir.display(), "Running {}", command_line);

        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| GitError::SpawnFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                command: command_line,
                stderr: stderr.trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| GitError::InvalidOutput)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::change::{parse_name_status_z, ChangeStatus};
    use std::fs;

    /// Run git synchronously in `dir`, panicking on failure
    pub(crate) fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args([
                "-c",
                "user.name=Migration Guard",
                "-c",
                "user.email=guard@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    /// Repository with `db/V1__init.sql`, `db/README.md` and `app/` committed
    pub(crate) fn committed_repo() -> tempfile::TempDir {
        let repo = tempfile::tempdir().unwrap();
        let root = repo.path();
        fs::create_dir_all(root.join("db")).unwrap();
        fs::create_dir_all(root.join("app")).unwrap();
        fs::write(root.join("db/V1__init.sql"), "create table a();\n").unwrap();
        fs::write(root.join("db/README.md"), "docs\n").unwrap();
        fs::write(root.join("app/main.txt"), "app\n").unwrap();
        git(root, &["init", "-q"]);
        git(root, &["add", "."]);
        git(root, &["commit", "-q", "-m", "initial"]);
        repo
    }

    #[test]
    fn test_diff_args_working_tree() {
        let args = GitClient::diff_args(None, Path::new("db/migrations"));
        assert_eq!(
            args,
            vec!["diff", "--name-status", "-z", "--", "db/migrations"]
        );
    }

    #[test]
    fn test_diff_args_with_branch() {
        let args = GitClient::diff_args(Some("origin/main"), Path::new("."));
        let ref_pos = args.iter().position(|a| a == "origin/main").unwrap();
        let sep_pos = args.iter().position(|a| a == "--").unwrap();
        assert!(ref_pos < sep_pos);
        assert_eq!(args.last().unwrap(), ".");
    }

    #[test]
    fn test_diff_args_ignores_empty_branch() {
        let args = GitClient::diff_args(Some(""), Path::new("."));
        assert_eq!(args.len(), 5);
        assert!(!args.iter().any(|a| a == "--relative"));
    }

    #[tokio::test]
    async fn test_toplevel_from_subdirectory() {
        let repo = committed_repo();
        let client = GitClient::new();
        let toplevel = client.toplevel(&repo.path().join("app")).await.unwrap();
        assert_eq!(
            fs::canonicalize(toplevel).unwrap(),
            fs::canonicalize(repo.path()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_working_tree_diff_is_relative_to_toplevel() {
        let repo = committed_repo();
        fs::write(repo.path().join("db/V1__init.sql"), "create table b();\n").unwrap();
        fs::write(repo.path().join("app/main.txt"), "changed\n").unwrap();

        let client = GitClient::new();
        let output = client
            .diff_name_status(repo.path(), None, Path::new("db"))
            .await
            .unwrap();

        let records = parse_name_status_z(&output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ChangeStatus::Modified);
        assert_eq!(records[0].new_path, "db/V1__init.sql");
    }

    #[tokio::test]
    async fn test_diff_against_ref() {
        let repo = committed_repo();
        let root = repo.path();
        fs::write(root.join("db/V2__add_col.sql"), "alter table a;\n").unwrap();
        git(root, &["add", "."]);
        git(root, &["commit", "-q", "-m", "second"]);

        let client = GitClient::new();
        let against_head = client
            .diff_name_status(root, None, Path::new("db"))
            .await
            .unwrap();
        assert!(against_head.is_empty());

        let output = client
            .diff_name_status(root, Some("HEAD~1"), Path::new("db"))
            .await
            .unwrap();
        let records = parse_name_status_z(&output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ChangeStatus::Added);
        assert_eq!(records[0].new_path, "db/V2__add_col.sql");
    }

    #[tokio::test]
    async fn test_rename_carries_similarity_score() {
        let repo = committed_repo();
        let root = repo.path();
        git(root, &["mv", "db/V1__init.sql", "db/V1__renamed.sql"]);

        let client = GitClient::new();
        let output = client
            .diff_name_status(root, Some("HEAD"), Path::new("db"))
            .await
            .unwrap();
        let records = parse_name_status_z(&output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ChangeStatus::Renamed);
        assert!(records[0].status_field.starts_with('R'));
        assert!(records[0].status_field.len() > 1);
        assert_eq!(records[0].old_path, "db/V1__init.sql");
        assert_eq!(records[0].new_path, "db/V1__renamed.sql");
    }

    #[tokio::test]
    async fn test_unknown_ref_is_command_failure() {
        let repo = committed_repo();
        let client = GitClient::new();
        let err = client
            .diff_name_status(repo.path(), Some("no-such-branch"), Path::new("db"))
            .await
            .unwrap_err();
        match err {
            GitError::CommandFailed { command, stderr } => {
                assert!(command.contains("no-such-branch"));
                assert!(!stderr.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
