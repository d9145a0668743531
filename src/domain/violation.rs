//! Violations of the append-only migration policy

use serde::Serialize;

/// Kind of rule breach detected for a change record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// An applied migration was edited
    ModifyAppliedMigration,
    /// An applied migration was removed
    DeleteAppliedMigration,
    /// An applied migration was renamed
    RenameAppliedMigration,
    /// A new migration sorts before an existing one
    AddedMigrationNotLast,
    /// The changed path could not be resolved against the migration root
    PathResolution { reason: String },
}

impl ViolationKind {
    /// Plain-text message for terminal output
    pub fn message(&self) -> String {
        match self {
            Self::ModifyAppliedMigration => {
                "Error: Cannot modify migration file after it was applied".to_string()
            }
            Self::DeleteAppliedMigration => {
                "Error: Cannot remove migration file after it was applied".to_string()
            }
            Self::RenameAppliedMigration => {
                "Error: Cannot rename migration file after it was applied".to_string()
            }
            Self::AddedMigrationNotLast => {
                "Error: Added migration file not alphabetically last".to_string()
            }
            Self::PathResolution { reason } => {
                format!("Error getting relative path: {}", reason)
            }
        }
    }

    /// Markdown message for merge request discussions
    pub fn markdown(&self) -> String {
        match self {
            Self::ModifyAppliedMigration => {
                ":warning: Error: Cannot **modify** migration file after it was applied"
                    .to_string()
            }
            Self::DeleteAppliedMigration => {
                ":warning: Error: Cannot **remove** migration file after it was applied"
                    .to_string()
            }
            Self::RenameAppliedMigration => {
                ":warning: Error: Cannot **rename** migration file after it was applied"
                    .to_string()
            }
            Self::AddedMigrationNotLast => {
                ":warning: Error: Added migration file **not** alphabetically **last**".to_string()
            }
            Self::PathResolution { reason } => {
                format!(":warning: Error getting **relative path**: {}", reason)
            }
        }
    }
}

/// One detected rule breach, located by the paths of its change record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    #[serde(flatten)]
    pub kind: ViolationKind,
    pub message: String,
    pub old_path: String,
    pub new_path: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            message: kind.message(),
            kind,
            old_path: old_path.into(),
            new_path: new_path.into(),
        }
    }

    pub fn markdown(&self) -> String {
        self.kind.markdown()
    }

    /// Path shown under the message in terminal output
    pub fn display_path(&self) -> &str {
        if self.new_path.is_empty() {
            &self.old_path
        } else {
            &self.new_path
        }
    }

    /// Whether the violation can be anchored to a file in a diff
    pub fn has_location(&self) -> bool {
        !self.new_path.is_empty() || !self.old_path.is_empty()
    }
}
