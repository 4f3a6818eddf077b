//! Operation client: the network exchange with the processing service.
//!
//! One payload is one multipart POST. The whole response body is buffered
//! before anything is returned, and nothing is retried: a single attempt
//! maps to a single user action, so a failure goes straight back to the
//! session which decides what the user sees.
//!
//! ## Failure classes
//!
//! | Condition | Error |
//! |-----------|-------|
//! | connect failure, timeout, transfer cut off | [`OperationError::Network`] |
//! | any non-2xx status | [`OperationError::Remote`] |
//! | body could not be read | [`OperationError::Decode`] |
//!
//! An empty body on a success status is still a result; it is logged and
//! returned as a zero-byte artifact.

use crate::config::ClientConfig;
use crate::error::{OperationError, SwiftConvertError};
use crate::output::ResultArtifact;
use crate::pipeline::request::{FieldValue, RequestPayload};
use futures::future::BoxFuture;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Anything that can carry a payload to the service and bring back bytes.
///
/// [`OperationClient`] is the HTTP implementation; the session only sees
/// this trait, which keeps it testable with a scripted stand-in.
pub trait OperationTransport: Send + Sync {
    fn execute<'a>(
        &'a self,
        payload: &'a RequestPayload,
    ) -> BoxFuture<'a, Result<ResultArtifact, OperationError>>;
}

/// HTTP client for the processing service.
#[derive(Debug, Clone)]
pub struct OperationClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: Option<u64>,
}

impl OperationClient {
    pub fn new(config: &ClientConfig) -> Result<Self, SwiftConvertError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| SwiftConvertError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Send `payload` and buffer the response body.
    pub async fn send(&self, payload: &RequestPayload) -> Result<ResultArtifact, OperationError> {
        let url = format!("{}{}", self.base_url, payload.endpoint);
        let start = Instant::now();
        info!(
            "POST {} ({} field(s), {} bytes of files)",
            url,
            payload.fields.len(),
            payload.upload_size()
        );

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "*/*")
            .multipart(to_form(payload))
            .send()
            .await
            .map_err(|e| self.network_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered HTTP {}", url, status);
            return Err(OperationError::Remote {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let data = response.bytes().await.map_err(|e| {
            if e.is_decode() {
                OperationError::Decode {
                    detail: e.to_string(),
                }
            } else {
                self.network_error(&e)
            }
        })?;

        if data.is_empty() {
            warn!("{} answered HTTP {} with an empty body", url, status);
        }

        debug!(
            "{}: {} bytes ({}) in {}ms",
            payload.endpoint,
            data.len(),
            content_type.as_deref().unwrap_or("no content type"),
            start.elapsed().as_millis()
        );

        Ok(ResultArtifact { data, content_type })
    }

    fn network_error(&self, e: &reqwest::Error) -> OperationError {
        let detail = match (e.is_timeout(), self.timeout_secs) {
            (true, Some(secs)) => format!("request timed out after {secs}s"),
            _ => e.to_string(),
        };
        OperationError::Network { detail }
    }
}

impl OperationTransport for OperationClient {
    fn execute<'a>(
        &'a self,
        payload: &'a RequestPayload,
    ) -> BoxFuture<'a, Result<ResultArtifact, OperationError>> {
        Box::pin(self.send(payload))
    }
}

/// Convert the plain payload into a reqwest multipart form.
fn to_form(payload: &RequestPayload) -> Form {
    payload
        .fields
        .iter()
        .fold(Form::new(), |form, field| match &field.value {
            FieldValue::Text(value) => form.text(field.name, value.clone()),
            FieldValue::File { filename, data } => {
                let part = Part::stream_with_length(data.clone(), data.len() as u64)
                    .file_name(filename.clone());
                form.part(field.name, part)
            }
        })
}
