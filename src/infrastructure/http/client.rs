use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors of a single endpoint request
#[derive(Error, Debug)]
pub enum HttpProbeError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: StatusCode,
        body: Value,
    },
}

/// A successful endpoint response
#[derive(Debug, Clone)]
pub struct EndpointResponse {
    pub url: String,
    pub status: StatusCode,
    /// JSON body, or the raw text as a JSON string when the body is not JSON
    pub body: Value,
}

/// Minimal unauthenticated JSON client bound to one base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HttpProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HttpProbeError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `path`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and decode the body
    pub async fn get(&self, path: &str) -> Result<EndpointResponse, HttpProbeError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| HttpProbeError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| HttpProbeError::Request {
                url: url.clone(),
                source,
            })?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            return Err(HttpProbeError::Status { url, status, body });
        }

        Ok(EndpointResponse { url, status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.url("/cities/airports"),
            "http://localhost:8080/cities/airports"
        );
        assert_eq!(client.url("health"), "http://localhost:8080/health");
    }

    #[tokio::test]
    async fn test_get_parses_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cities/airports")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"city":"Oslo","airports":2}]"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), Duration::from_secs(5)).unwrap();
        let response = client.get("/cities/airports").await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!([{"city": "Oslo", "airports": 2}]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_json_body_becomes_string() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/plain")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), Duration::from_secs(5)).unwrap();
        let response = client.get("/plain").await.unwrap();
        assert_eq!(response.body, Value::String("hello".to_string()));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/passengers/airports")
            .with_status(500)
            .with_body(r#"{"error":"boom"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), Duration::from_secs(5)).unwrap();
        match client.get("/passengers/airports").await.unwrap_err() {
            HttpProbeError::Status { status, body, .. } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, json!({"error": "boom"}));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
