//! Configuration and per-tool parameters.
//!
//! Connection and limit settings live in [`ClientConfig`], built via
//! [`ClientConfigBuilder`]. The values a user adjusts per tool (conversion
//! pair, rotation angle, page order) live in [`OperationParameters`], which
//! the session owns and resets on every tool switch.

use crate::error::SwiftConvertError;
use crate::matrix::ConversionPair;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Per-file upload limit enforced before any request is sent: 20 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Where the processing service listens when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Configuration for talking to the processing service.
///
/// Built via [`ClientConfig::builder()`] or using
/// [`ClientConfig::default()`].
///
/// # Example
/// ```rust
/// use swiftconvert::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("https://tools.example.com")
///     .timeout_secs(90)
///     .output_dir("downloads")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme and authority the endpoint paths are appended to.
    /// Default: `http://localhost:8080`.
    pub base_url: String,

    /// Largest accepted input file in bytes (inclusive). Default: 20 MiB.
    pub max_file_size: u64,

    /// Whole-request timeout in seconds. Default: none.
    ///
    /// When unset a stalled exchange keeps the session in flight until the
    /// connection itself gives up.
    pub timeout_secs: Option<u64>,

    /// Directory that receives saved artifacts. Default: current directory.
    pub output_dir: PathBuf,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            timeout_secs: None,
            output_dir: PathBuf::from("."),
            user_agent: concat!("swiftconvert/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Absolute URL for an endpoint path such as `/api/merge`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs.max(1));
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, SwiftConvertError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(SwiftConvertError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.max_file_size == 0 {
            return Err(SwiftConvertError::InvalidConfig(
                "max file size must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Tool parameters ──────────────────────────────────────────────────────

/// Clockwise rotation applied by the rotate tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationAngle {
    /// 90° clockwise. (default)
    #[default]
    Deg90,
    Deg180,
    /// 270° clockwise.
    Deg270,
}

impl RotationAngle {
    pub const ALL: [RotationAngle; 3] = [
        RotationAngle::Deg90,
        RotationAngle::Deg180,
        RotationAngle::Deg270,
    ];

    pub fn degrees(self) -> u16 {
        match self {
            RotationAngle::Deg90 => 90,
            RotationAngle::Deg180 => 180,
            RotationAngle::Deg270 => 270,
        }
    }
}

impl fmt::Display for RotationAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

impl FromStr for RotationAngle {
    type Err = SwiftConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('°') {
            "90" => Ok(RotationAngle::Deg90),
            "180" => Ok(RotationAngle::Deg180),
            "270" => Ok(RotationAngle::Deg270),
            _ => Err(SwiftConvertError::InvalidAngle(s.to_string())),
        }
    }
}

/// Values the user sets for the current tool.
///
/// Each operation reads only the field that concerns it; the others keep
/// their values but are not sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationParameters {
    /// Convert: source and target format. Default: DOCX → PDF.
    pub conversion: ConversionPair,
    /// Rotate: clockwise angle. Default: 90.
    pub angle: RotationAngle,
    /// Reorder: page-order expression such as `1,3,2,4-last`.
    ///
    /// Only the service interprets it. Default: `1,2,3`.
    pub page_order: String,
}

impl Default for OperationParameters {
    fn default() -> Self {
        Self {
            conversion: ConversionPair::default(),
            angle: RotationAngle::default(),
            page_order: "1,2,3".to_string(),
        }
    }
}
