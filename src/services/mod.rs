//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and infrastructure.
//! Services use infrastructure adapters to perform I/O operations.

pub mod validation_service;

// Re-export commonly used types
pub use validation_service::{ValidationReport, ValidationService};
