//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - Git operations (the change-status report)
//! - The migration directory on disk
//! - GitLab merge request discussions

pub mod diff_source;
pub mod git;
pub mod gitlab;
pub mod migration_dir;

// Re-export commonly used types
pub use diff_source::DiffSource;
pub use gitlab::GitLabReporter;
pub use migration_dir::scan_migration_files;
