//! Change-status report parsing
//!
//! Turns the output of `git diff --name-status` into [`ChangeRecord`]s.
//! Parsing is purely textual: no process, no filesystem.

use tracing::trace;

/// Kind of change reported for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
}

impl ChangeStatus {
    /// Parse from the leading letter of a status field.
    ///
    /// Trailing characters (e.g. the similarity score in `R087`) are ignored.
    pub fn from_field(field: &str) -> Option<Self> {
        match field.chars().next()? {
            'M' => Some(Self::Modified),
            'A' => Some(Self::Added),
            'D' => Some(Self::Deleted),
            'R' => Some(Self::Renamed),
            _ => None,
        }
    }
}

/// One line of a change-status report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub status: ChangeStatus,
    /// Raw status field as reported (e.g. `R099`)
    pub status_field: String,
    pub old_path: String,
    /// Same as `old_path` unless the line carried three fields
    pub new_path: String,
}

impl ChangeRecord {
    /// Path the status rule applies to: the old path for deletions,
    /// the new path otherwise.
    pub fn checked_path(&self) -> &str {
        match self.status {
            ChangeStatus::Deleted => &self.old_path,
            _ => &self.new_path,
        }
    }
}

/// Parse a name-status report into change records, in input order.
///
/// Tab-separated lines keep spaces inside paths; anything else is split
/// on whitespace. Lines with fewer than two fields or an unknown status
/// letter are skipped.
pub fn parse_name_status(report: &str) -> Vec<ChangeRecord> {
    report.lines().filter_map(parse_line).collect()
}

/// Parse NUL-separated `git diff --name-status -z` output.
///
/// Paths are taken verbatim, so names containing tabs, newlines or
/// quotes survive. Rename and copy entries carry two paths.
pub fn parse_name_status_z(report: &str) -> Vec<ChangeRecord> {
    let mut fields = report.split('\0').filter(|f| !f.is_empty());
    let mut records = Vec::new();

    while let Some(status_field) = fields.next() {
        let path_count = if status_field.starts_with(['R', 'C']) { 2 } else { 1 };
        let paths: Vec<&str> = fields.by_ref().take(path_count).collect();
        let Some(old_path) = paths.first().copied() else {
            break;
        };

        if let Some(record) = build_record(status_field, old_path, paths.get(1).copied()) {
            records.push(record);
        }
    }

    records
}

fn parse_line(line: &str) -> Option<ChangeRecord> {
    let line = line.trim_end_matches('\r');

    let fields: Vec<&str> = if line.contains('\t') {
        line.split('\t')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect()
    } else {
        line.split_whitespace().collect()
    };

    if fields.len() < 2 {
        return None;
    }

    build_record(fields[0], fields[1], fields.get(2).copied())
}

fn build_record(status_field: &str, old_path: &str, new_path: Option<&str>) -> Option<ChangeRecord> {
    let Some(status) = ChangeStatus::from_field(status_field) else {
        trace!(status = %status_field, path = %old_path, "Skipping unsupported status");
        return None;
    };

    Some(ChangeRecord {
        status,
        status_field: status_field.to_string(),
        old_path: old_path.to_string(),
        new_path: new_path.unwrap_or(old_path).to_string(),
    })
}
