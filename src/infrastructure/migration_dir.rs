//! Migration directory scanning

use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::migration::relative_to;
use crate::domain::{MigrationFileSet, OrderingMode};
use crate::error::GuardError;

/// Collect every regular migration file under `root`, relative to it.
///
/// Subdirectories are traversed except `.git`; symlinks are not
/// followed. A walk error (e.g. an unreadable directory) fails the scan.
pub fn scan_migration_files(
    root: &Path,
    ordering: OrderingMode,
) -> Result<MigrationFileSet, GuardError> {
    if !root.is_dir() {
        return Err(GuardError::MigrationDirMissing {
            path: root.to_path_buf(),
        });
    }

    let mut relative_paths = Vec::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| GuardError::ScanFailed {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative =
            relative_to(root, entry.path()).map_err(|e| GuardError::ScanFailed {
                path: entry.path().to_path_buf(),
                message: e.to_string(),
            })?;

        relative_paths.push(relative);
    }

    let files = MigrationFileSet::from_paths(relative_paths, ordering);

    debug!(
        "Found {} migration files under {}",
        files.len(),
        root.display()
    );

    Ok(files)
}
