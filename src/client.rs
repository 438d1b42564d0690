//! Shared HTTP client for the backend under test
//!
//! One pooled `reqwest::Client` is built per run and handed to every
//! scenario; dropping it at the end of the run releases the sockets on all
//! exit paths. Transport failures surface as `ClientError` which scenarios
//! convert into recorded error outcomes instead of propagating.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Per-request timeout. The backend is a preview deployment and can be slow,
/// but a hung request must not stall the whole run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Failed to read response body from {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Status code plus decoded body of one backend response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body, `Value::Null` when the body was not valid JSON
    pub body: Value,
    /// Raw body text, kept for diagnostics on shape mismatches
    pub text: String,
}

impl ApiResponse {
    /// Convenience accessor: `body[key]` as a string slice
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    /// Convenience accessor: `body[key]` as a bool
    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.body.get(key).and_then(Value::as_bool)
    }

    /// Convenience accessor: `body[key]` as an f64
    pub fn num_field(&self, key: &str) -> Option<f64> {
        self.body.get(key).and_then(Value::as_f64)
    }
}

/// HTTP session wrapper around the backend's REST surface
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<ApiResponse, ClientError> {
        let url = self.url(path);
        let mut request = self.http.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.execute(url, request).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url(path);
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.execute(url, request).await
    }

    /// POST with extra headers (webhook signature simulation)
    pub async fn post_json_with_headers(
        &self,
        path: &str,
        body: &Value,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url(path);
        let mut request = self.http.post(&url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.execute(url, request).await
    }

    /// POST without a body (token verification, capture, cancel)
    pub async fn post_empty(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url(path);
        let mut request = self.http.post(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.execute(url, request).await
    }

    /// PUT without a body (status updates driven by query parameters)
    pub async fn put_empty(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url(path);
        let mut request = self.http.put(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.execute(url, request).await
    }

    pub async fn delete(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url(path);
        let mut request = self.http.delete(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.execute(url, request).await
    }

    async fn execute(
        &self,
        url: String,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse, ClientError> {
        let response = request.send().await.map_err(|source| ClientError::Request {
            url: url.clone(),
            source,
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|source| ClientError::Body {
                url: url.clone(),
                source,
            })?;

        // Non-JSON bodies are a shape mismatch for the scenario to judge,
        // not a transport error.
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        debug!(url = %url, status, "backend response");

        Ok(ApiResponse { status, body, text })
    }
}
