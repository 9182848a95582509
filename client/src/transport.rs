//! The HTTP collaborator that executes requests built by `waas-core`.
//!
//! # Design
//! `Transport` is the only I/O seam. Non-2xx statuses come back as ordinary
//! `HttpResponse` values so `waas_core::classify` stays the single place that
//! interprets them. Only failures without a response (connect errors,
//! timeouts, unreadable bodies) become `ApiError::Transport { status: None }`.
//! There are no retries here; callers own that policy.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;
use waas_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `reqwest`-backed transport with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Error for a 2xx response whose body could not be read.
fn unreadable_body(url: &str, status: u16, error: reqwest::Error) -> ApiError {
    warn!(url, status, error = %error, "failed to read response body");
    ApiError::Transport {
        status: Some(status),
        body: String::new(),
        message: format!("failed to read response body: {error}"),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.client.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            let reason = if e.is_timeout() { "request timed out" } else { "request failed" };
            warn!(method = request.method.as_str(), url = %request.url, error = %e, "{reason}");
            ApiError::network(format!("{reason}: {e}"))
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if !(200..300).contains(&status) => {
                warn!(url = %request.url, status, error = %e, "failed to read error response body");
                String::new()
            }
            Err(e) => return Err(unreadable_body(&request.url, status, e)),
        };

        Ok(HttpResponse { status, headers, body })
    }
}
