//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Read file contents with standardized error handling.
///
/// Wraps `fs::read_to_string` with consistent `Error::internal_io` formatting.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Write content to a fresh temporary file with the given suffix.
///
/// The file lives as long as the returned handle and is removed when it drops.
pub fn write_temp_file(content: &str, suffix: &str, operation: &str) -> Result<NamedTempFile> {
    let io_err = |e: std::io::Error| Error::internal_io(e.to_string(), Some(operation.to_string()));

    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;

    Ok(file)
}
