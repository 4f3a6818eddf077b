//! Error types for the swiftconvert library.
//!
//! Three narrow error types follow the three places where a user action can
//! fail, and one umbrella type collects them for callers that do not care:
//!
//! * [`ValidationError`]: raised synchronously while staging files. It
//!   never reaches the network.
//!
//! * [`OperationError`]: raised by the remote exchange. The session turns
//!   it into a generic status message but keeps the kind for diagnostics.
//!
//! * [`NoSuchSource`]: a compatibility-matrix lookup for a format that has
//!   no declared conversion. Callers that only offer declared source formats
//!   never see it.
//!
//! * [`SwiftConvertError`]: everything else that is fatal to one call
//!   (unreadable input, unwritable output, bad configuration) plus
//!   `#[from]` wrappers for the three types above.

use crate::format::Format;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the swiftconvert library.
#[derive(Debug, Error)]
pub enum SwiftConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed part-way.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Parameter errors ──────────────────────────────────────────────────
    /// The name does not match any operation id.
    #[error("Unknown operation '{0}'\nExpected one of: convert, merge, split, compress, extract-text, extract-images, rotate, reorder")]
    UnknownOperation(String),

    /// The name does not match any supported format.
    #[error("Unknown format '{0}'")]
    UnknownFormat(String),

    /// Rotation angle outside {90, 180, 270}.
    #[error("Invalid rotation angle '{0}': must be 90, 180 or 270")]
    InvalidAngle(String),

    /// The (from, to) pair is not in the compatibility matrix.
    #[error("Conversion {from} → {to} is not supported")]
    UnsupportedConversion { from: Format, to: Format },

    // ── Wrapped errors ────────────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    NoSuchSource(#[from] NoSuchSource),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the artifact file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A selected file set was rejected before any request was built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// At least one file is larger than the per-file limit.
    ///
    /// `files` lists every offending name in selection order.
    #[error("{}", file_too_large_message(.files, .limit))]
    FileTooLarge { files: Vec<String>, limit: u64 },

    /// No file was selected.
    #[error("No files selected")]
    EmptySelection,
}

/// The remote exchange failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// Connection could not be established, timed out, or was interrupted.
    #[error("Network error: {detail}")]
    Network { detail: String },

    /// The service answered with a non-success status.
    #[error("Remote service returned HTTP {status}")]
    Remote { status: u16 },

    /// The response arrived but its body was unusable.
    #[error("Malformed response: {detail}")]
    Decode { detail: String },
}

impl OperationError {
    /// Short stable name of the failure class, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            OperationError::Network { .. } => "network",
            OperationError::Remote { .. } => "remote",
            OperationError::Decode { .. } => "decode",
        }
    }
}

/// A compatibility lookup was made for a format with no declared conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No conversion is declared from {format}")]
pub struct NoSuchSource {
    pub format: Format,
}

fn file_too_large_message(files: &[String], limit: &u64) -> String {
    let verb = if files.len() == 1 {
        "1 file exceeds".to_string()
    } else {
        format!("{} files exceed", files.len())
    };
    format!("{verb} the {} limit: {}", format_limit(*limit), files.join(", "))
}

pub(crate) fn format_limit(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}
