//! # swiftconvert
//!
//! Client for a remote document-processing service: convert between
//! formats, merge, split, compress, extract text or images, rotate and
//! reorder pages.
//!
//! The service does the actual document work. This crate owns everything
//! on the client side of that exchange: which conversions are legal, which
//! selections may be sent, what each request looks like, how a response
//! becomes a file on disk, and the request lifecycle in between.
//!
//! ## Pipeline Overview
//!
//! ```text
//! selection
//!  │
//!  ├─ 1. Validate  size limit, file count per tool
//!  ├─ 2. Request   multipart fields for the chosen tool
//!  ├─ 3. Client    one POST, body fully buffered, no retry
//!  └─ 4. Download  {tool}_{millis}.{ext}, atomic write
//! ```
//!
//! [`OperationSession`] sequences the stages and holds the lifecycle state
//! (`idle → staged → in-flight → success | error`).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swiftconvert::{
//!     ArtifactDownloader, CandidateFile, ClientConfig, Completion, Format, Operation,
//!     OperationClient, OperationSession,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:8080")
//!         .output_dir("out")
//!         .build()?;
//!     let client = OperationClient::new(&config)?;
//!     let downloader = ArtifactDownloader::new(&config.output_dir);
//!
//!     let mut session = OperationSession::new(&config);
//!     session.select_tool(Operation::Convert);
//!     session.select_files(vec![CandidateFile::from_path("report.docx").await?])?;
//!     session.set_conversion(Format::Docx, Format::Pdf)?;
//!
//!     if let Some(Completion::Saved(saved)) = session.run(&client, &downloader).await {
//!         println!("saved {}", saved.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `swiftconvert` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! swiftconvert = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod files;
pub mod format;
pub mod matrix;
pub mod operation;
pub mod output;
pub mod pipeline;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder, OperationParameters, RotationAngle};
pub use error::{NoSuchSource, OperationError, SwiftConvertError, ValidationError};
pub use files::{CandidateFile, FileSet};
pub use format::{Format, FormatFamily};
pub use matrix::{CompatibilityMatrix, ConversionPair};
pub use operation::Operation;
pub use output::{Artifact, ResultArtifact, SavedArtifact};
pub use pipeline::client::{OperationClient, OperationTransport};
pub use pipeline::download::{derive_filename, ArtifactDownloader};
pub use pipeline::request::{build as build_request, FieldValue, FormField, RequestPayload};
pub use pipeline::validate::validate;
pub use session::{Attempt, Completion, OperationSession, PendingAttempt, SessionState};
