// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! REST submission of scan operations.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use invsync_core::OpId;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::hub::AuthProvider;

/// Header carrying the operation id so the server can drop redeliveries.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Path of the scan submission endpoint, relative to the API base URL.
pub const SCANS_PATH: &str = "/api/scans";

/// Error type for submissions.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    /// The server could not be reached or answered with a transient failure.
    #[error("server unreachable: {0}")]
    Connectivity(String),

    /// The server refused the operation.
    #[error("rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The credential is missing or was refused.
    #[error("not authorized to submit")]
    Unauthorized,
}

impl SubmitError {
    /// Whether the operation should be kept for a later retry.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, SubmitError::Connectivity(_))
    }
}

/// Result type for submissions.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Future returned by [`Submitter::submit`].
pub type SubmitFuture<'a> = Pin<Box<dyn Future<Output = SubmitResult<Value>> + Send + 'a>>;

/// Sends one operation to the server.
pub trait Submitter: Send + Sync {
    /// Submit `payload`, identified by `id`. Resolves to the server's reply.
    fn submit<'a>(&'a self, id: &'a OpId, payload: &'a Value) -> SubmitFuture<'a>;
}

/// Submitter that POSTs JSON to the inventory API.
pub struct HttpSubmitter {
    client: Client,
    endpoint: String,
    auth: Arc<dyn AuthProvider>,
}

impl HttpSubmitter {
    pub fn new(
        api_url: &str,
        timeout: Duration,
        auth: Arc<dyn AuthProvider>,
    ) -> SubmitResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::Connectivity(e.to_string()))?;
        Ok(HttpSubmitter {
            client,
            endpoint: endpoint_url(api_url),
            auth,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Submitter for HttpSubmitter {
    fn submit<'a>(&'a self, id: &'a OpId, payload: &'a Value) -> SubmitFuture<'a> {
        Box::pin(async move {
            let mut request = self
                .client
                .post(&self.endpoint)
                .header(IDEMPOTENCY_HEADER, id.as_str())
                .json(payload);
            if let Some(token) = self.auth.credential() {
                request = request.bearer_auth(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| SubmitError::Connectivity(e.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| SubmitError::Connectivity(format!("failed to read body: {e}")))?;

            classify(status, &body)?;
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
        })
    }
}

fn endpoint_url(api_url: &str) -> String {
    format!("{}{}", api_url.trim_end_matches('/'), SCANS_PATH)
}

/// Map a response status to the submission outcome.
///
/// Server errors, timeouts and throttling are transient: the operation stays
/// queued. Other client errors are rejections.
fn classify(status: StatusCode, body: &str) -> SubmitResult<()> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SubmitError::Unauthorized),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            Err(SubmitError::Connectivity(format!("server answered {status}")))
        }
        s if s.is_server_error() => Err(SubmitError::Connectivity(format!("server answered {s}"))),
        s => Err(SubmitError::Rejected {
            status: s.as_u16(),
            message: rejection_message(body),
        }),
    }
}

/// Extract a human-readable message from an error body.
fn rejection_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = parsed.as_ref().and_then(|v| {
        ["message", "error", "title"]
            .iter()
            .find_map(|key| v.get(key).and_then(Value::as_str))
    });
    match field {
        Some(message) => message.to_string(),
        None if body.trim().is_empty() => "no details".to_string(),
        None => body.trim().to_string(),
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
