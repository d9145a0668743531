//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod change;
pub mod classifier;
pub mod migration;
pub mod violation;

// Re-export commonly used types
pub use change::{parse_name_status, parse_name_status_z, ChangeRecord};
pub use classifier::classify_all;
pub use migration::{MigrationFileSet, OrderingMode};
pub use violation::Violation;
