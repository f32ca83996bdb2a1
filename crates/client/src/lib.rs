// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ob-client: offline capture and replay for HTTP mutations
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  ApiClient  │────►│  Transport  │────►│   Server    │
//! │  (capture)  │     │   (trait)   │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │ no response + offline  ▲
//!        ▼                        │
//! ┌─────────────┐     ┌─────────────┐
//! │   Outbox    │────►│ReplayEngine │◄─── ReplayTrigger
//! │  (ob-core)  │     │  (drain)    │     (startup, reconnect, foreground)
//! └─────────────┘     └─────────────┘
//! ```

pub mod capture;
pub mod connectivity;
pub mod credentials;
pub mod replay;
pub mod transport;
pub mod trigger;

pub use reqwest::{header, Method};

pub use capture::{ApiClient, ClientError, ClientResult, Dispatch, QUEUED_STATUS};
pub use connectivity::{Connectivity, ManualConnectivity, NetworkState, ProbeConnectivity};
pub use credentials::{CredentialProvider, SessionCredentials, StaticCredentials};
pub use replay::{DrainOutcome, ReplayEngine, ReplayError};
pub use transport::{
    ApiRequest, ApiResponse, HttpConfig, HttpTransport, Transport, TransportError, TransportResult,
};
pub use trigger::{AppState, ReplayTrigger, TriggerHandle, TriggerReason};

#[cfg(test)]
mod test_helpers;
