//! Utility functions for error handling
//!
//! Helpers that turn filesystem failures into [`LinkageError`]s carrying the
//! path and the reason the file was needed.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{LinkageError, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.is_file() {
        return Err(LinkageError::io(
            path,
            format!("Expected a file for: {purpose}"),
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        ));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check file permissions".to_string()
            }
            _ => format!("Failed to open file for: {purpose}"),
        };
        LinkageError::io(path, context, e)
    })
}

/// Safely create (or truncate) a file for writing
pub fn safe_create_file(path: &Path, purpose: &str) -> Result<fs::File> {
    fs::File::create(path)
        .map_err(|e| LinkageError::io(path, format!("Failed to create file for: {purpose}"), e))
}

/// Check that a directory exists and is readable
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.is_dir() {
        return Err(LinkageError::io(
            path,
            format!("Expected a directory for: {purpose}"),
            io::Error::new(io::ErrorKind::NotFound, "directory not found"),
        ));
    }

    match fs::read_dir(path) {
        Ok(_) => Ok(()),
        Err(e) => {
            let context = match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    "Permission denied - check directory permissions".to_string()
                }
                _ => format!("Failed to access directory for: {purpose}"),
            };
            Err(LinkageError::io(path, context, e))
        }
    }
}

/// Create a directory (and parents) if it does not exist yet
pub fn ensure_directory(path: &Path, purpose: &str) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| LinkageError::io(path, format!("Failed to create directory for: {purpose}"), e))
}
