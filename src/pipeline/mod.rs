//! Pipeline stages for one operation attempt.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the session only sequences them.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ request ──▶ client ──▶ download
//! (FileSet)    (payload)   (HTTP)     (disk)
//! ```
//!
//! 1. [`validate`] — size and count rules; yields a staged [`crate::files::FileSet`]
//! 2. [`request`]  — pure multipart payload for the chosen tool
//! 3. [`client`]   — the only stage with network I/O; no retry
//! 4. [`download`] — derive the artifact name and write it atomically

pub mod client;
pub mod download;
pub mod request;
pub mod validate;
