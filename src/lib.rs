pub mod core;
pub mod utils;

// Re-export everything from core for ergonomic library use
// Users can write `torchdock::matrix` instead of `torchdock::core::matrix`
pub use crate::core::*;
