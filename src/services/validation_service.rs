//! Validation service - runs one migration validation pass
//!
//! Reads the change report, scans the migration directory once, and
//! classifies every record before any exit decision is made.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::domain::{classify_all, Violation};
use crate::error::GuardError;
use crate::infrastructure::{scan_migration_files, DiffSource, GitLabReporter};

/// Result of a validation pass
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Number of change records parsed from the report
    pub records_checked: usize,
    /// Number of migration files found on disk
    pub migration_files: usize,
    /// Violations, in the order of their change records
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Service for validating migration changes
pub struct ValidationService {
    settings: Settings,
}

impl ValidationService {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Validate the migration directory against its change report.
    ///
    /// Fails only on precondition errors; rule breaches are returned
    /// in the report.
    pub async fn run(&self) -> Result<ValidationReport, GuardError> {
        let dir = &self.settings.migration_dir;
        if !dir.is_dir() {
            return Err(GuardError::MigrationDirMissing { path: dir.clone() });
        }
        debug!("Verify dir: {}", dir.display());

        let source = DiffSource::select(
            self.settings.diff_file.clone(),
            self.settings.compare_ref.clone(),
        );
        info!("Reading changes from {}", source.describe());
        let changes = source.read(dir).await?;

        let files = scan_migration_files(dir, self.settings.ordering)?;
        if files.is_empty() {
            debug!(dir = %dir.display(), "No migration files on disk");
        }
        debug!(
            records = changes.records.len(),
            migration_files = files.len(),
            last = files.last().unwrap_or("<none>"),
            root = %changes.migration_root.display(),
            "Change report loaded"
        );

        let violations = classify_all(&changes.records, &changes.migration_root, &files);

        Ok(ValidationReport {
            records_checked: changes.records.len(),
            migration_files: files.len(),
            violations,
        })
    }

    /// Post violations to the merge request when integration is enabled.
    ///
    /// Best effort: failures are logged and never change the outcome.
    pub async fn publish(&self, report: &ValidationReport) {
        let Some(gitlab) = &self.settings.gitlab else {
            return;
        };
        if report.is_valid() {
            return;
        }

        let result = match GitLabReporter::new(gitlab.clone()) {
            Ok(reporter) => reporter.report(&report.violations).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            warn!("Error integrating with GitLab: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::domain::violation::ViolationKind;
    use crate::domain::OrderingMode;
    use crate::infrastructure::git::tests::committed_repo;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn settings(migration_dir: &Path, diff_file: PathBuf) -> Settings {
        Settings {
            migration_dir: migration_dir.to_path_buf(),
            compare_ref: None,
            debug: false,
            diff_file: Some(diff_file),
            format: OutputFormat::Text,
            ordering: OrderingMode::Lexical,
            integration: false,
            gitlab: None,
        }
    }

    fn migration_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("V1__init.sql"), "create table a();").unwrap();
        fs::write(dir.path().join("V2__add_col.sql"), "alter table a;").unwrap();
        fs::write(dir.path().join("README.md"), "docs").unwrap();
        dir
    }

    fn write_report(dir: &Path, lines: &[(&str, &str)]) -> PathBuf {
        let body: String = lines
            .iter()
            .map(|(status, name)| format!("{}\t{}\n", status, dir.join(name).display()))
            .collect();
        let path = dir.join("changes.txt");
        fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_run_reports_violations_in_order() {
        let tree = migration_tree();
        let report_dir = tempfile::tempdir().unwrap();
        let body = format!(
            "M\t{}\nA\t{}\nA\t{}\n",
            tree.path().join("V2__add_col.sql").display(),
            tree.path().join("README.md").display(),
            tree.path().join("V1__init.sql").display(),
        );
        let diff_file = report_dir.path().join("changes.txt");
        fs::write(&diff_file, body).unwrap();

        let service = ValidationService::new(settings(tree.path(), diff_file));
        let report = service.run().await.unwrap();

        assert_eq!(report.records_checked, 3);
        assert_eq!(report.migration_files, 2);
        assert!(!report.is_valid());
        let kinds: Vec<&ViolationKind> = report.violations.iter().map(|v| &v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &ViolationKind::ModifyAppliedMigration,
                &ViolationKind::AddedMigrationNotLast
            ]
        );
    }

    #[tokio::test]
    async fn test_run_accepts_new_last_migration() {
        let tree = migration_tree();
        let diff_file = write_report(tree.path(), &[("A", "V2__add_col.sql")]);

        let service = ValidationService::new(settings(tree.path(), diff_file));
        let report = service.run().await.unwrap();
        assert!(report.is_valid());
    }

    #[tokio::test]
    async fn test_run_with_empty_report() {
        let tree = migration_tree();
        let diff_file = tree.path().join("empty.txt");
        fs::write(&diff_file, "").unwrap();

        let service = ValidationService::new(settings(tree.path(), diff_file));
        let report = service.run().await.unwrap();
        assert!(report.is_valid());
        assert_eq!(report.records_checked, 0);
    }

    #[tokio::test]
    async fn test_run_missing_directory_fails() {
        let tree = migration_tree();
        let missing = tree.path().join("absent");
        let service = ValidationService::new(settings(&missing, tree.path().join("x.txt")));
        let err = service.run().await.unwrap_err();
        assert!(matches!(err, GuardError::MigrationDirMissing { .. }));
    }

    #[tokio::test]
    async fn test_publish_without_integration_is_noop() {
        let tree = migration_tree();
        let service = ValidationService::new(settings(tree.path(), tree.path().join("x.txt")));
        let report = ValidationReport {
            records_checked: 1,
            migration_files: 2,
            violations: vec![Violation::new(
                ViolationKind::ModifyAppliedMigration,
                "V1__init.sql",
                "V1__init.sql",
            )],
        };
        // Returns without attempting any network call
        service.publish(&report).await;
    }

    fn git_settings(migration_dir: PathBuf) -> Settings {
        Settings {
            diff_file: None,
            ..settings(&migration_dir, PathBuf::new())
        }
    }

    #[tokio::test]
    async fn test_git_run_with_absolute_migration_dir() {
        let repo = committed_repo();
        let db = repo.path().join("db");
        fs::write(db.join("V1__init.sql"), "create table b();\n").unwrap();
        fs::write(db.join("README.md"), "more docs\n").unwrap();

        let service = ValidationService::new(git_settings(db));
        let report = service.run().await.unwrap();

        assert_eq!(report.records_checked, 2);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::ModifyAppliedMigration);
        assert_eq!(report.violations[0].new_path, "db/V1__init.sql");
    }

    #[tokio::test]
    async fn test_git_run_with_sibling_migration_dir() {
        let repo = committed_repo();
        fs::write(repo.path().join("db/V1__init.sql"), "create table b();\n").unwrap();

        let service = ValidationService::new(git_settings(repo.path().join("app/../db")));
        let report = service.run().await.unwrap();

        assert!(!report.is_valid());
        assert_eq!(report.violations[0].kind, ViolationKind::ModifyAppliedMigration);
    }

    #[tokio::test]
    async fn test_git_run_accepts_new_last_migration() {
        let repo = committed_repo();
        fs::write(repo.path().join("db/V2__add_col.sql"), "alter table a;\n").unwrap();
        crate::infrastructure::git::tests::git(repo.path(), &["add", "db/V2__add_col.sql"]);

        let mut settings = git_settings(repo.path().join("db"));
        settings.compare_ref = Some("HEAD".to_string());
        let report = ValidationService::new(settings).run().await.unwrap();

        assert_eq!(report.records_checked, 1);
        assert!(report.is_valid());
    }
}
