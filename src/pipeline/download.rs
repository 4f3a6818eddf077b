//! Artifact saving: name the response body and write it to disk.
//!
//! Filenames follow `{operation_id}_{unix_millis}.{ext}`:
//!
//! | Operation | Extension |
//! |-----------|-----------|
//! | split, extract-images | `zip` |
//! | convert | target format, lower-case |
//! | everything else | `pdf` |
//!
//! The timestamp keeps repeated runs from overwriting each other, so names
//! are not reproducible across calls.

use crate::error::SwiftConvertError;
use crate::format::Format;
use crate::operation::Operation;
use crate::output::{Artifact, ResultArtifact, SavedArtifact};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension for an artifact of `operation`.
pub fn artifact_extension(operation: Operation, conversion_target: Option<Format>) -> String {
    if operation.produces_archive() {
        return "zip".to_string();
    }
    match (operation, conversion_target) {
        (Operation::Convert, Some(target)) => target.wire_name(),
        _ => "pdf".to_string(),
    }
}

/// Deterministic filename for the given timestamp.
pub fn derive_filename(
    operation: Operation,
    conversion_target: Option<Format>,
    timestamp_millis: i64,
) -> String {
    format!(
        "{}_{}.{}",
        operation.id(),
        timestamp_millis,
        artifact_extension(operation, conversion_target)
    )
}

/// Pair a response body with the name it will be saved under.
pub fn name_artifact(
    result: ResultArtifact,
    operation: Operation,
    conversion_target: Option<Format>,
    timestamp_millis: i64,
) -> Artifact {
    Artifact {
        data: result.data,
        filename: derive_filename(operation, conversion_target, timestamp_millis),
        extension: artifact_extension(operation, conversion_target),
    }
}

/// Writes artifacts into one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactDownloader {
    output_dir: PathBuf,
}

impl ArtifactDownloader {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Name `result` with the current time and write it to the output
    /// directory.
    ///
    /// The write is atomic (temp file + rename), so a failed save never
    /// leaves a truncated artifact behind.
    pub async fn save(
        &self,
        result: ResultArtifact,
        operation: Operation,
        conversion_target: Option<Format>,
    ) -> Result<SavedArtifact, SwiftConvertError> {
        let now = chrono::Utc::now().timestamp_millis();
        let artifact = name_artifact(result, operation, conversion_target, now);
        self.write(artifact).await
    }

    /// Write an already-named artifact.
    pub async fn write(&self, artifact: Artifact) -> Result<SavedArtifact, SwiftConvertError> {
        let path = self.output_dir.join(&artifact.filename);
        let write_err = |source| SwiftConvertError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(write_err)?;

        let tmp_path = path.with_extension(format!("{}.tmp", artifact.extension));
        let written = match tokio::fs::write(&tmp_path, &artifact.data).await {
            Ok(()) => tokio::fs::rename(&tmp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                debug!("Could not remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(write_err(e));
        }

        info!("Saved {} ({} bytes)", path.display(), artifact.data.len());

        Ok(SavedArtifact {
            size: artifact.data.len() as u64,
            filename: artifact.filename,
            path,
        })
    }
}
