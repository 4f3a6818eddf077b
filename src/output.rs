//! Result types produced by an operation attempt.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw body of a successful service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArtifact {
    pub data: Bytes,
    /// `Content-Type` header as sent by the service, if any.
    pub content_type: Option<String>,
}

impl ResultArtifact {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            content_type: None,
        }
    }
}

/// A response body paired with the filename it will be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub data: Bytes,
    pub filename: String,
    pub extension: String,
}

/// Where an artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedArtifact {
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
}
