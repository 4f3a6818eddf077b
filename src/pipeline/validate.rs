//! File-set validation: gate a raw selection before it is staged.
//!
//! Rules, applied in this order:
//!
//! 1. Every candidate must be at most `max_file_size` bytes. All offenders
//!    are reported together and nothing is accepted.
//! 2. An empty selection is rejected for every tool.
//! 3. Merge keeps the whole selection; every other tool keeps only the first
//!    file and ignores the rest.
//!
//! The size rule covers files that step 3 would drop, so an oversized extra
//! file still rejects a single-file selection.

use crate::error::ValidationError;
use crate::files::{CandidateFile, FileSet};
use crate::operation::Operation;
use tracing::debug;

/// Validate `candidates` for `operation` against a per-file byte limit.
pub fn validate(
    operation: Operation,
    candidates: Vec<CandidateFile>,
    max_file_size: u64,
) -> Result<FileSet, ValidationError> {
    let oversized: Vec<String> = candidates
        .iter()
        .filter(|f| f.size() > max_file_size)
        .map(|f| f.name().to_string())
        .collect();
    if !oversized.is_empty() {
        debug!(
            "{}: rejected selection, {} file(s) over {} bytes",
            operation,
            oversized.len(),
            max_file_size
        );
        return Err(ValidationError::FileTooLarge {
            files: oversized,
            limit: max_file_size,
        });
    }

    if candidates.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    let mut files = candidates;
    if !operation.accepts_multiple() && files.len() > 1 {
        debug!(
            "{}: single-file tool, ignoring {} extra file(s)",
            operation,
            files.len() - 1
        );
        files.truncate(1);
    }

    Ok(FileSet::new(files))
}
