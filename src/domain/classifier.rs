//! Migration change classification
//!
//! Maps each change record to at most one violation, given the
//! migration files present under the migration root.

use std::path::Path;
use tracing::debug;

use super::change::{ChangeRecord, ChangeStatus};
use super::migration::{is_migration_file, relative_to, MigrationFileSet};
use super::violation::{Violation, ViolationKind};

/// Classify a single change record.
pub fn classify(
    record: &ChangeRecord,
    migration_root: &Path,
    files: &MigrationFileSet,
) -> Option<Violation> {
    let relative = match relative_to(migration_root, Path::new(record.checked_path())) {
        Ok(relative) => relative,
        Err(e) => {
            return Some(Violation::new(
                ViolationKind::PathResolution {
                    reason: e.to_string(),
                },
                &record.old_path,
                &record.new_path,
            ));
        }
    };

    let is_migration = is_migration_file(&relative);
    let is_last = files.is_last(&relative);

    debug!(
        path = %record.new_path,
        status = %record.status_field,
        is_migration,
        is_last,
        "Processing change"
    );

    if !is_migration {
        return None;
    }

    let kind = match record.status {
        ChangeStatus::Modified => ViolationKind::ModifyAppliedMigration,
        ChangeStatus::Deleted => ViolationKind::DeleteAppliedMigration,
        ChangeStatus::Renamed => ViolationKind::RenameAppliedMigration,
        ChangeStatus::Added if is_last => return None,
        ChangeStatus::Added => ViolationKind::AddedMigrationNotLast,
    };

    Some(Violation::new(kind, &record.old_path, &record.new_path))
}

/// Classify every record, keeping violations in record order.
pub fn classify_all(
    records: &[ChangeRecord],
    migration_root: &Path,
    files: &MigrationFileSet,
) -> Vec<Violation> {
    records
        .iter()
        .filter_map(|record| classify(record, migration_root, files))
        .collect()
}
