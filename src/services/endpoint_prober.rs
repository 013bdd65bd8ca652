//! Endpoint probes against the ready service
//!
//! Requests run one after another; a failing endpoint never prevents the
//! remaining ones from being probed.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::infrastructure::http::{ApiClient, HttpProbeError};

/// Outcome of one endpoint probe
#[derive(Debug, Clone, Serialize)]
pub struct EndpointResult {
    pub path: String,
    pub url: String,
    /// HTTP status, absent when no response was received
    pub status: Option<u16>,
    pub body: Option<Value>,
    pub error: Option<String>,
}

impl EndpointResult {
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Results of all probes, in request order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbeReport {
    pub base_url: String,
    pub results: Vec<EndpointResult>,
}

impl ProbeReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Issues the configured GET probes
pub struct EndpointProber {
    client: ApiClient,
    endpoints: Vec<String>,
}

impl EndpointProber {
    pub fn new(
        base_url: impl Into<String>,
        endpoints: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, HttpProbeError> {
        Ok(Self {
            client: ApiClient::new(base_url, timeout)?,
            endpoints,
        })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Probe every endpoint
    pub async fn probe_all(&self) -> ProbeReport {
        let mut results = Vec::with_capacity(self.endpoints.len());
        for path in &self.endpoints {
            results.push(self.probe(path).await);
        }

        let report = ProbeReport {
            base_url: self.client.base_url().to_string(),
            results,
        };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "endpoint probes finished"
        );
        report
    }

    async fn probe(&self, path: &str) -> EndpointResult {
        match self.client.get(path).await {
            Ok(response) => EndpointResult {
                path: path.to_string(),
                url: response.url,
                status: Some(response.status.as_u16()),
                body: Some(response.body),
                error: None,
            },
            Err(e) => {
                tracing::warn!(path, error = %e, "endpoint probe failed");
                let (status, body) = match &e {
                    HttpProbeError::Status { status, body, .. } => {
                        (Some(status.as_u16()), Some(body.clone()))
                    }
                    HttpProbeError::Client(_) | HttpProbeError::Request { .. } => (None, None),
                };
                EndpointResult {
                    path: path.to_string(),
                    url: self.client.url(path),
                    status,
                    body,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
