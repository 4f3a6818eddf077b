//! In-memory input files.
//!
//! A [`CandidateFile`] is whatever the user picked, read fully into memory.
//! A [`FileSet`] is the validated, ordered selection the session stages for
//! one attempt; it can only be produced by
//! [`crate::pipeline::validate::validate`], so holding one means the size
//! and count rules have already passed.

use crate::error::SwiftConvertError;
use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A user-selected file: a name and its bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateFile {
    name: String,
    data: Bytes,
}

impl CandidateFile {
    /// Wrap bytes that are already in memory.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a local file. The name is the path's final component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, SwiftConvertError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| map_read_error(path, e))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!("Read {} ({} bytes)", path.display(), data.len());
        Ok(Self::from_bytes(name, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Shared handle to the contents; cloning does not copy the bytes.
    pub fn data(&self) -> Bytes {
        self.data.clone()
    }
}

impl fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("size", &self.data.len())
            .finish()
    }
}

fn map_read_error(path: &Path, e: std::io::Error) -> SwiftConvertError {
    let path: PathBuf = path.to_path_buf();
    match e.kind() {
        std::io::ErrorKind::NotFound => SwiftConvertError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => SwiftConvertError::PermissionDenied { path },
        _ => SwiftConvertError::ReadFailed { path, source: e },
    }
}

/// A validated, non-empty, ordered selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<CandidateFile>,
}

impl FileSet {
    /// Callers must guarantee `files` is non-empty.
    pub(crate) fn new(files: Vec<CandidateFile>) -> Self {
        debug_assert!(!files.is_empty());
        Self { files }
    }

    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    /// The file single-file tools operate on.
    pub fn first(&self) -> &CandidateFile {
        &self.files[0]
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(CandidateFile::size).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateFile> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a CandidateFile;
    type IntoIter = std::slice::Iter<'a, CandidateFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Format a byte count as megabytes with two decimals, e.g. `"1.50 MB"`.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}
