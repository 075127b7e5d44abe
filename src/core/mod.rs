// Public modules
pub mod config;
pub mod dockerfile;
pub mod engine;
pub mod error;
pub mod job;
pub mod logging;
pub mod matrix;
pub mod output;
pub mod spec;
pub mod versions;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use output::{BulkResult, BulkSummary, ItemOutcome};
