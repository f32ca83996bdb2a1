// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client wrapper that queues mutations it cannot deliver while offline.
//!
//! Every request gets the current bearer token. A `401` answer triggers one
//! token refresh and one retry. A mutation that gets no response while the
//! device reports no connection is written to the outbox and reported as
//! [`Dispatch::Queued`] instead of failing.

use std::collections::BTreeMap;
use std::sync::Arc;

use ob_core::{Outbox, OutboxEntry, OutboxMethod};
use reqwest::header::HeaderMap;
use reqwest::Method;
use tracing::{debug, warn};

use crate::connectivity::Connectivity;
use crate::credentials::CredentialProvider;
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};

/// Status reported for a request that was queued instead of sent.
pub const QUEUED_STATUS: u16 = 202;

/// Outcome of [`ApiClient::send`].
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The server answered with a success status.
    Sent(ApiResponse),
    /// The request was stored in the outbox for later replay.
    Queued(OutboxEntry),
}

impl Dispatch {
    pub fn is_queued(&self) -> bool {
        matches!(self, Dispatch::Queued(_))
    }

    /// The status code seen by the caller; [`QUEUED_STATUS`] when queued.
    pub fn status(&self) -> u16 {
        match self {
            Dispatch::Sent(response) => response.status,
            Dispatch::Queued(_) => QUEUED_STATUS,
        }
    }
}

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request failed and was not eligible for queuing.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request was eligible for queuing but could not be stored.
    #[error("failed to queue request: {0}")]
    Queue(#[from] ob_core::Error),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// HTTP client with offline capture.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    connectivity: Arc<dyn Connectivity>,
    outbox: Outbox,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        connectivity: Arc<dyn Connectivity>,
        outbox: Outbox,
    ) -> Self {
        ApiClient {
            transport,
            credentials,
            connectivity,
            outbox,
        }
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Sends `request`, queuing it if it is a mutation that got no response
    /// while offline.
    pub async fn send(&self, request: ApiRequest) -> ClientResult<Dispatch> {
        let error = match self.execute_authorized(request.clone()).await {
            Ok(response) => return Ok(Dispatch::Sent(response)),
            Err(e) => e,
        };

        let Some(method) = capture_method(&request.method, &error) else {
            return Err(error.into());
        };
        let state = self.connectivity.fetch().await;
        if state.is_connected {
            debug!(url = %request.url, "request failed while connected, not queuing");
            return Err(error.into());
        }

        let entry = self
            .outbox
            .enqueue(
                method,
                request.url.as_str(),
                request.body.as_ref(),
                string_headers(&request.headers),
            )
            .await?;
        warn!(url = %request.url, id = %entry.id, "request queued in outbox");
        Ok(Dispatch::Queued(entry))
    }

    async fn execute_authorized(&self, mut request: ApiRequest) -> Result<ApiResponse, TransportError> {
        if let Some(token) = self.credentials.token().await {
            request.set_bearer(&token)?;
        }

        match self.transport.execute(request.clone()).await {
            Err(TransportError::Rejected(response)) if response.status == 401 => {
                let Some(token) = self.credentials.refresh().await else {
                    return Err(TransportError::Rejected(response));
                };
                debug!(url = %request.url, "retrying with refreshed token");
                request.set_bearer(&token)?;
                self.transport.execute(request).await
            }
            result => result,
        }
    }
}

/// Returns the outbox method for a failed request that may be queued.
///
/// Only mutations that received no response qualify.
pub fn capture_method(method: &Method, error: &TransportError) -> Option<OutboxMethod> {
    if !error.is_no_response() {
        return None;
    }
    OutboxMethod::from_http_name(method.as_str())
}

/// Returns the headers whose values are plain visible strings.
///
/// `None` when there are no headers at all.
pub fn string_headers(headers: &HeaderMap) -> Option<BTreeMap<String, String>> {
    if headers.is_empty() {
        return None;
    }
    Some(
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect(),
    )
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
