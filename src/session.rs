//! The operation session: one tool, one staged selection, one attempt at a
//! time.
//!
//! [`OperationSession`] owns every piece of mutable state a front end needs
//! (selected tool, staged files, tool parameters, lifecycle) and is the only
//! thing that changes [`SessionState`]. The pipeline stages it sequences are
//! stateless.
//!
//! ## Lifecycle
//!
//! ```text
//!            select_files ok           begin()
//!   Idle ───────────────────▶ Staged ──────────▶ InFlight
//!    ▲  ◀── select_files err ──┘                  │
//!    │                                 complete() │
//!    │ select_tool          ┌── Ok + saved ◀──────┤
//!    └──────────────────────┤                     │
//!                     Success / Error ◀── Err ────┘
//! ```
//!
//! `Success` and `Error` keep the staged files, so the action can be
//! triggered again; a new selection or tool switch clears the message.
//!
//! ## Superseded attempts
//!
//! Every attempt carries a sequence number. Switching tools or reselecting
//! files while an attempt is in flight invalidates that number, and a result
//! that arrives for it later is dropped by [`OperationSession::complete`]
//! without touching state.

use crate::config::{ClientConfig, OperationParameters, RotationAngle, DEFAULT_MAX_FILE_SIZE};
use crate::error::{format_limit, NoSuchSource, OperationError, SwiftConvertError, ValidationError};
use crate::files::{format_megabytes, CandidateFile, FileSet};
use crate::format::Format;
use crate::matrix::{CompatibilityMatrix, ConversionPair};
use crate::operation::Operation;
use crate::output::{ResultArtifact, SavedArtifact};
use crate::pipeline::client::OperationTransport;
use crate::pipeline::download::ArtifactDownloader;
use crate::pipeline::request::{self, RequestPayload};
use crate::pipeline::validate;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Status shown while a request is in flight.
pub const PROCESSING_MESSAGE: &str = "Processing your request...";

/// Status shown for any failed attempt. The specific cause goes to the log.
pub const FAILURE_MESSAGE: &str = "Operation failed. Please try again.";

/// Status shown when the selection is empty.
pub const EMPTY_SELECTION_MESSAGE: &str = "No files selected.";

/// Where the session is in its lifecycle. Each variant carries only the data
/// that is meaningful in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SessionState {
    /// Nothing staged. `message` explains a rejected selection.
    Idle { message: Option<String> },
    /// Files staged, action available.
    Staged,
    /// A request is outstanding.
    InFlight,
    /// The last attempt's artifact was saved.
    Success { message: String, saved: SavedArtifact },
    /// The last attempt failed.
    Error { message: String },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle { .. } => "idle",
            SessionState::Staged => "staged",
            SessionState::InFlight => "in-flight",
            SessionState::Success { .. } => "success",
            SessionState::Error { .. } => "error",
        }
    }

    /// User-facing status line, if the state has one.
    pub fn message(&self) -> Option<&str> {
        match self {
            SessionState::Idle { message } => message.as_deref(),
            SessionState::Staged => None,
            SessionState::InFlight => Some(PROCESSING_MESSAGE),
            SessionState::Success { message, .. } | SessionState::Error { message } => {
                Some(message)
            }
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle { message: None }
    }
}

/// A started attempt: the payload to send and the sequence number to report
/// its result under.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub seq: u64,
    pub operation: Operation,
    /// Target format when the operation is convert.
    pub conversion_target: Option<Format>,
    pub payload: RequestPayload,
}

/// An attempt whose exchange runs on a spawned tokio task.
#[derive(Debug)]
pub struct PendingAttempt {
    seq: u64,
    handle: JoinHandle<Result<ResultArtifact, OperationError>>,
}

impl PendingAttempt {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Stop the exchange. Awaiting it afterwards yields a network error.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait for the exchange and return `(seq, result)` for
    /// [`OperationSession::complete`].
    pub async fn join(self) -> (u64, Result<ResultArtifact, OperationError>) {
        let result = match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(OperationError::Network {
                detail: "request aborted".into(),
            }),
            Err(e) => Err(OperationError::Network {
                detail: format!("request task failed: {e}"),
            }),
        };
        (self.seq, result)
    }
}

/// What [`OperationSession::complete`] did with a result.
#[derive(Debug)]
pub enum Completion {
    /// The artifact was saved; state is `Success`.
    Saved(SavedArtifact),
    /// The exchange or the save failed; state is `Error`.
    Failed(SwiftConvertError),
    /// The result belonged to a superseded attempt and was dropped.
    Superseded,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    seq: u64,
    operation: Operation,
    conversion_target: Option<Format>,
}

/// Orchestrates tool selection, staging, dispatch and result handling.
#[derive(Debug)]
pub struct OperationSession {
    matrix: &'static CompatibilityMatrix,
    max_file_size: u64,
    operation: Operation,
    parameters: OperationParameters,
    files: Option<FileSet>,
    state: SessionState,
    seq: u64,
    in_flight: Option<InFlight>,
    last_error: Option<OperationError>,
}

impl Default for OperationSession {
    fn default() -> Self {
        Self::with_matrix(CompatibilityMatrix::standard(), DEFAULT_MAX_FILE_SIZE)
    }
}

impl OperationSession {
    /// A session on the standard matrix with the config's size limit.
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_matrix(CompatibilityMatrix::standard(), config.max_file_size)
    }

    pub fn with_matrix(matrix: &'static CompatibilityMatrix, max_file_size: u64) -> Self {
        Self {
            matrix,
            max_file_size,
            operation: Operation::default(),
            parameters: OperationParameters::default(),
            files: None,
            state: SessionState::default(),
            seq: 0,
            in_flight: None,
            last_error: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn parameters(&self) -> &OperationParameters {
        &self.parameters
    }

    pub fn file_set(&self) -> Option<&FileSet> {
        self.files.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn matrix(&self) -> &'static CompatibilityMatrix {
        self.matrix
    }

    /// The most recent exchange failure, kept for diagnostics.
    pub fn last_error(&self) -> Option<&OperationError> {
        self.last_error.as_ref()
    }

    /// Number of outstanding exchanges this session still cares about.
    pub fn pending_requests(&self) -> usize {
        usize::from(self.in_flight.is_some())
    }

    /// Whether the action button should be enabled.
    pub fn action_enabled(&self) -> bool {
        self.files.is_some() && self.in_flight.is_none()
    }

    pub fn action_label(&self) -> &'static str {
        if self.in_flight.is_some() {
            "Processing..."
        } else {
            self.operation.label()
        }
    }

    pub fn status_message(&self) -> Option<&str> {
        self.state.message()
    }

    /// `"report.pdf"` for one file, `"3 files selected"` for several.
    pub fn selection_summary(&self) -> Option<String> {
        let files = self.files.as_ref()?;
        Some(if files.len() == 1 {
            files.first().name().to_string()
        } else {
            format!("{} files selected", files.len())
        })
    }

    /// Combined size of the staged files, e.g. `"1.50 MB total"`.
    pub fn total_size_label(&self) -> Option<String> {
        let files = self.files.as_ref()?;
        Some(format!("{} total", format_megabytes(files.total_size())))
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Switch tools. Clears files, parameters and status, and supersedes
    /// any attempt in flight.
    pub fn select_tool(&mut self, operation: Operation) {
        self.supersede();
        info!("Tool selected: {}", operation);
        self.operation = operation;
        self.files = None;
        self.parameters = OperationParameters::default();
        self.state = SessionState::Idle { message: None };
        self.last_error = None;
    }

    /// Validate and stage a new selection, replacing the previous one.
    ///
    /// For convert, a single file whose extension names a declared source
    /// format also sets the conversion to that source and its default
    /// target.
    pub fn select_files(&mut self, candidates: Vec<CandidateFile>) -> Result<(), ValidationError> {
        self.supersede();
        self.last_error = None;
        let selected = candidates.len();

        match validate::validate(self.operation, candidates, self.max_file_size) {
            Ok(set) => {
                if self.operation == Operation::Convert && selected == 1 {
                    self.apply_inferred_conversion(set.first().name());
                }
                info!(
                    "{}: staged {} file(s), {} bytes",
                    self.operation,
                    set.len(),
                    set.total_size()
                );
                self.files = Some(set);
                self.state = SessionState::Staged;
                Ok(())
            }
            Err(e) => {
                warn!("{}: selection rejected: {}", self.operation, e);
                self.files = None;
                self.state = SessionState::Idle {
                    message: Some(self.rejection_message(&e)),
                };
                Err(e)
            }
        }
    }

    fn apply_inferred_conversion(&mut self, filename: &str) {
        let Some(source) = self.matrix.infer_format_from_filename(filename) else {
            return;
        };
        if let Ok(target) = self.matrix.default_target(source) {
            debug!("Inferred {} → {} from '{}'", source, target, filename);
            self.parameters.conversion = ConversionPair::new(source, target);
        }
    }

    fn rejection_message(&self, e: &ValidationError) -> String {
        match e {
            ValidationError::FileTooLarge { limit, .. } => {
                format!("One or more files exceed {} limit.", format_limit(*limit))
            }
            ValidationError::EmptySelection => EMPTY_SELECTION_MESSAGE.to_string(),
        }
    }

    // ── Parameters ───────────────────────────────────────────────────────

    /// Set both conversion formats. The pair must be declared in the matrix.
    pub fn set_conversion(&mut self, from: Format, to: Format) -> Result<(), SwiftConvertError> {
        if !self.matrix.is_valid_pair(from, to) {
            return Err(SwiftConvertError::UnsupportedConversion { from, to });
        }
        self.parameters.conversion = ConversionPair::new(from, to);
        Ok(())
    }

    /// Change the source format; the target resets to its default.
    pub fn set_source_format(&mut self, from: Format) -> Result<(), NoSuchSource> {
        let to = self.matrix.default_target(from)?;
        self.parameters.conversion = ConversionPair::new(from, to);
        Ok(())
    }

    pub fn set_angle(&mut self, angle: RotationAngle) {
        self.parameters.angle = angle;
    }

    pub fn set_page_order(&mut self, order: impl Into<String>) {
        self.parameters.page_order = order.into();
    }

    // ── Dispatch ─────────────────────────────────────────────────────────

    /// Start an attempt with the staged files.
    ///
    /// Returns `None`, changing nothing, when no files are staged or an
    /// attempt is already in flight.
    pub fn begin(&mut self) -> Option<Attempt> {
        if let Some(current) = self.in_flight {
            debug!("Action ignored: attempt #{} still in flight", current.seq);
            return None;
        }
        let files = self.files.as_ref()?;

        let payload = request::build(self.operation, files, &self.parameters);
        let conversion_target =
            (self.operation == Operation::Convert).then_some(self.parameters.conversion.to);

        self.seq += 1;
        let attempt = Attempt {
            seq: self.seq,
            operation: self.operation,
            conversion_target,
            payload,
        };
        self.in_flight = Some(InFlight {
            seq: attempt.seq,
            operation: attempt.operation,
            conversion_target,
        });
        self.last_error = None;
        self.state = SessionState::InFlight;

        info!(
            "Attempt #{}: {} → {}",
            attempt.seq, attempt.operation, attempt.payload.endpoint
        );
        Some(attempt)
    }

    /// Apply the result of attempt `seq`.
    ///
    /// On success the artifact is saved through `downloader` before the
    /// state becomes `Success`. Results for anything but the current
    /// in-flight attempt are dropped.
    pub async fn complete(
        &mut self,
        seq: u64,
        result: Result<ResultArtifact, OperationError>,
        downloader: &ArtifactDownloader,
    ) -> Completion {
        let current = match self.in_flight {
            Some(current) if current.seq == seq => current,
            _ => {
                debug!("Discarding result of superseded attempt #{}", seq);
                return Completion::Superseded;
            }
        };
        self.in_flight = None;

        let artifact = match result {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(
                    "Attempt #{} ({}) failed [{}]: {}",
                    seq,
                    current.operation,
                    e.kind(),
                    e
                );
                self.last_error = Some(e.clone());
                self.state = SessionState::Error {
                    message: FAILURE_MESSAGE.to_string(),
                };
                return Completion::Failed(e.into());
            }
        };

        match downloader
            .save(artifact, current.operation, current.conversion_target)
            .await
        {
            Ok(saved) => {
                self.state = SessionState::Success {
                    message: format!("Operation successful! Saved {}.", saved.filename),
                    saved: saved.clone(),
                };
                Completion::Saved(saved)
            }
            Err(e) => {
                error!("Attempt #{}: could not save artifact: {}", seq, e);
                self.state = SessionState::Error {
                    message: FAILURE_MESSAGE.to_string(),
                };
                Completion::Failed(e)
            }
        }
    }

    /// Begin, execute and complete in one call. `None` when [`begin`] was a
    /// no-op.
    ///
    /// [`begin`]: OperationSession::begin
    pub async fn run(
        &mut self,
        transport: &dyn OperationTransport,
        downloader: &ArtifactDownloader,
    ) -> Option<Completion> {
        let attempt = self.begin()?;
        let result = transport.execute(&attempt.payload).await;
        Some(self.complete(attempt.seq, result, downloader).await)
    }

    /// Begin an attempt and run its exchange on a spawned tokio task.
    ///
    /// The session stays free for tool switches and reselection while the
    /// exchange runs; feed the joined result back through
    /// [`OperationSession::complete`]. Must be called inside a tokio
    /// runtime.
    pub fn dispatch(&mut self, transport: Arc<dyn OperationTransport>) -> Option<PendingAttempt> {
        let attempt = self.begin()?;
        let payload = attempt.payload;
        let handle = tokio::spawn(async move { transport.execute(&payload).await });
        Some(PendingAttempt {
            seq: attempt.seq,
            handle,
        })
    }

    fn supersede(&mut self) {
        if let Some(current) = self.in_flight.take() {
            info!("Attempt #{} superseded; its result will be ignored", current.seq);
        }
    }
}
