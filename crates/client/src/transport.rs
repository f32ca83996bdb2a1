// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for HTTP requests.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP requests through reqwest for production
//! - Mock transports for unit testing
//!
//! Failures are split by whether the server answered. Only
//! [`TransportError::NoResponse`] can lead to a request being queued.

use std::path::Path;
use std::time::Duration;

use ob_core::{BoxFuture, FileRef, Multipart, PartValue, RequestBody};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use tracing::warn;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// An HTTP request as issued by application code.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL, or a path resolved against the transport's base URL.
    pub url: String,
    pub body: Option<RequestBody>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        ApiRequest {
            method,
            url: url.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Sets a JSON body.
    pub fn json(mut self, value: Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    /// Sets a multipart form body.
    pub fn multipart(mut self, form: Multipart) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    pub fn body(mut self, body: Option<RequestBody>) -> Self {
        self.body = body;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds a header from strings, rejecting invalid names or values.
    pub fn try_header(self, name: &str, value: &str) -> TransportResult<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidRequest(format!("invalid value for header {name}: {e}")))?;
        Ok(self.header(name, value))
    }

    /// Replaces the `Authorization` header with a bearer token.
    pub fn set_bearer(&mut self, token: &str) -> TransportResult<()> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| TransportError::InvalidRequest(format!("invalid bearer token: {e}")))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// A response received from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Parsed JSON body, or the raw text as a JSON string when not JSON.
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: u16) -> Self {
        ApiResponse {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error type for transport operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("server responded with status {}", .0.status)]
    Rejected(ApiResponse),

    /// No response was received: offline, DNS failure, refused, timed out.
    #[error("no response from server: {0}")]
    NoResponse(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn is_no_response(&self) -> bool {
        matches!(self, TransportError::NoResponse(_))
    }

    /// Returns the response status when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Rejected(response) => Some(response.status),
            _ => None,
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport trait for issuing HTTP requests.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Execute a request.
    ///
    /// Non-success statuses are returned as [`TransportError::Rejected`].
    fn execute(&self, request: ApiRequest) -> BoxFuture<'_, TransportResult<ApiResponse>>;
}

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL relative request URLs are joined to. Empty means none.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            base_url: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP transport implementation using reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(HttpTransport {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Resolves `url` against the base URL.
    ///
    /// Absolute URLs are used as is; anything else is appended to the base
    /// with exactly one slash between them.
    pub fn resolve(&self, url: &str) -> TransportResult<reqwest::Url> {
        let full = if is_absolute(url) || self.base_url.is_empty() {
            url.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                url.trim_start_matches('/')
            )
        };
        reqwest::Url::parse(&full)
            .map_err(|e| TransportError::InvalidRequest(format!("invalid url {full:?}: {e}")))
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ApiRequest) -> BoxFuture<'_, TransportResult<ApiResponse>> {
        Box::pin(async move {
            let url = self.resolve(&request.url)?;
            let mut headers = request.headers;

            let builder = match request.body {
                Some(RequestBody::Json(value)) => {
                    self.client.request(request.method, url).headers(headers).json(&value)
                }
                Some(RequestBody::Multipart(form)) => {
                    // The form sets its own boundary and length.
                    headers.remove(CONTENT_TYPE);
                    headers.remove(CONTENT_LENGTH);
                    let form = build_form(form).await?;
                    self.client.request(request.method, url).headers(headers).multipart(form)
                }
                None => self.client.request(request.method, url).headers(headers),
            };

            let response = builder.send().await.map_err(classify)?;
            let status = response.status();
            let headers = response.headers().clone();
            // Answered: a failed body read is not a missing response.
            let body = match response.bytes().await {
                Ok(bytes) => parse_body(&bytes),
                Err(e) => {
                    warn!(status = status.as_u16(), error = %e, "failed to read response body");
                    None
                }
            };

            let response = ApiResponse {
                status: status.as_u16(),
                headers,
                body,
            };
            if response.is_success() {
                Ok(response)
            } else {
                Err(TransportError::Rejected(response))
            }
        })
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::NoResponse(err.to_string())
    }
}

/// Parses a response body as JSON, falling back to a JSON string.
pub(crate) fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

pub(crate) async fn build_form(multipart: Multipart) -> TransportResult<Form> {
    let mut form = Form::new();
    for (name, value) in multipart.into_parts() {
        form = match value {
            PartValue::Text(text) => form.text(name, text),
            PartValue::File(file) => form.part(name, file_part(file).await?),
            PartValue::Bytes(binary) => {
                let part = named_part(Part::bytes(binary.data), binary.name, binary.mime_type)?;
                form.part(name, part)
            }
            PartValue::Other(Value::String(text)) => form.text(name, text),
            PartValue::Other(value) => form.text(name, value.to_string()),
        };
    }
    Ok(form)
}

async fn file_part(file: FileRef) -> TransportResult<Part> {
    let path = file.uri.strip_prefix("file://").unwrap_or(&file.uri);
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| TransportError::InvalidRequest(format!("cannot read file part {path}: {e}")))?;
    let name = file.name.or_else(|| {
        Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    });
    named_part(Part::bytes(data), name, file.mime_type)
}

fn named_part(mut part: Part, name: Option<String>, mime_type: Option<String>) -> TransportResult<Part> {
    if let Some(name) = name {
        part = part.file_name(name);
    }
    if let Some(mime_type) = mime_type {
        part = part
            .mime_str(&mime_type)
            .map_err(|e| TransportError::InvalidRequest(format!("invalid mime type {mime_type:?}: {e}")))?;
    }
    Ok(part)
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
