//! Centralized validation and helper functions.

use std::path::{Path, PathBuf};

/// Maximum number of records read from a single molecule file (DOS protection)
pub const MAX_RECORDS: usize = 1_000_000;

/// Check if adding another record would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new record.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if check_record_limit(molecules.len()).is_some() {
///     return Err(...);
/// }
/// molecules.push(mol); // Safe to add
/// ```
#[must_use]
pub fn check_record_limit(count: usize) -> Option<String> {
    if count >= MAX_RECORDS {
        Some(format!(
            "Too many records: adding another would exceed maximum of {MAX_RECORDS}"
        ))
    } else {
        None
    }
}

/// Safely convert usize to f64 for ratios and timings
///
/// Counts here are bounded by [`MAX_RECORDS`], well within the exact integer
/// range of an f64 mantissa.
#[inline]
#[must_use]
pub fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Output path validation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Output path is a directory: {0}")]
    OutputIsDirectory(PathBuf),
    #[error("Output directory does not exist: {0}")]
    MissingOutputDirectory(PathBuf),
    #[error("Output path would overwrite input file: {0}")]
    OutputOverwritesInput(PathBuf),
}

/// Validate a report destination before any work is done
///
/// Rejects directories, destinations whose parent directory is missing, and
/// destinations that name one of the input files.
///
/// # Errors
///
/// Returns the first `ValidationError` that applies.
pub fn validate_output_path(output: &Path, inputs: &[&Path]) -> Result<(), ValidationError> {
    if output.is_dir() {
        return Err(ValidationError::OutputIsDirectory(output.to_path_buf()));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(ValidationError::MissingOutputDirectory(parent.to_path_buf()));
        }
    }

    let canonical_output = output.canonicalize().ok();
    for input in inputs {
        let same = match (&canonical_output, input.canonicalize().ok()) {
            (Some(out), Some(inp)) => *out == inp,
            _ => output == *input,
        };
        if same {
            return Err(ValidationError::OutputOverwritesInput(output.to_path_buf()));
        }
    }

    Ok(())
}
