// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer credentials attached to outgoing and replayed requests.

use std::sync::Arc;

use ob_core::{BoxFuture, KeyValueStore};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::transport::{ApiRequest, Transport, TransportError};

/// Storage key of the access token.
pub const TOKEN_KEY: &str = "clinicq/token";

/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "clinicq/refresh-token";

/// Default path of the token refresh endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh/";

/// Supplies the current bearer token.
pub trait CredentialProvider: Send + Sync {
    /// Returns the current access token, if any.
    fn token(&self) -> BoxFuture<'_, Option<String>>;

    /// Obtains a new access token after the server rejected the current one.
    ///
    /// Returns `None` when the session cannot be refreshed.
    fn refresh(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin(async { None })
    }
}

/// A fixed token that never refreshes.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(pub Option<String>);

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        StaticCredentials(Some(token.into()))
    }

    pub fn none() -> Self {
        StaticCredentials(None)
    }
}

impl CredentialProvider for StaticCredentials {
    fn token(&self) -> BoxFuture<'_, Option<String>> {
        let token = self.0.clone();
        Box::pin(async move { token })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// Access and refresh tokens persisted in a [`KeyValueStore`].
///
/// Tokens are loaded lazily on first use and cached in memory.
pub struct SessionCredentials {
    storage: Arc<dyn KeyValueStore>,
    transport: Arc<dyn Transport>,
    refresh_path: String,
    /// `None` until loaded from storage.
    cache: Mutex<Option<Tokens>>,
}

impl SessionCredentials {
    pub fn new(storage: Arc<dyn KeyValueStore>, transport: Arc<dyn Transport>) -> Self {
        SessionCredentials {
            storage,
            transport,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            cache: Mutex::new(None),
        }
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Stores new tokens. A missing refresh token keeps the existing one.
    pub async fn persist(&self, access: &str, refresh: Option<&str>) -> ob_core::Result<()> {
        let mut cache = self.cache.lock().await;
        let mut tokens = self.loaded(&mut cache).await;

        self.storage.set_string(TOKEN_KEY, access.to_string()).await?;
        tokens.access = Some(access.to_string());
        if let Some(refresh) = refresh {
            self.storage.set_string(REFRESH_TOKEN_KEY, refresh.to_string()).await?;
            tokens.refresh = Some(refresh.to_string());
        }

        *cache = Some(tokens);
        Ok(())
    }

    /// Forgets both tokens.
    pub async fn clear(&self) -> ob_core::Result<()> {
        let mut cache = self.cache.lock().await;
        *cache = Some(Tokens::default());
        self.storage.remove(TOKEN_KEY).await?;
        self.storage.remove(REFRESH_TOKEN_KEY).await
    }

    async fn loaded(&self, cache: &mut Option<Tokens>) -> Tokens {
        if let Some(tokens) = cache.as_ref() {
            return tokens.clone();
        }
        let tokens = Tokens {
            access: self.read(TOKEN_KEY).await,
            refresh: self.read(REFRESH_TOKEN_KEY).await,
        };
        *cache = Some(tokens.clone());
        tokens
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.storage.get_string(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "failed to read credential");
                None
            }
        }
    }

    async fn refresh_session(&self) -> Option<String> {
        let mut cache = self.cache.lock().await;
        let mut tokens = self.loaded(&mut cache).await;
        let refresh = tokens.refresh.clone()?;

        let request = ApiRequest::post(self.refresh_path.as_str()).json(json!({ "refresh": refresh }));
        match self.transport.execute(request).await {
            Ok(response) => {
                let access = response
                    .body
                    .as_ref()
                    .and_then(|body| body.get("access"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                match access {
                    Some(access) => {
                        if let Err(e) = self.storage.set_string(TOKEN_KEY, access.clone()).await {
                            warn!(error = %e, "failed to persist refreshed token");
                        }
                        tokens.access = Some(access.clone());
                        *cache = Some(tokens);
                        info!("access token refreshed");
                        Some(access)
                    }
                    None => {
                        warn!("refresh response carried no access token, clearing session");
                        self.forget(&mut cache).await;
                        None
                    }
                }
            }
            Err(TransportError::NoResponse(reason)) => {
                warn!(%reason, "token refresh got no response");
                None
            }
            Err(e) => {
                warn!(error = %e, "token refresh rejected, clearing session");
                self.forget(&mut cache).await;
                None
            }
        }
    }

    async fn forget(&self, cache: &mut Option<Tokens>) {
        *cache = Some(Tokens::default());
        for key in [TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key).await {
                warn!(key, error = %e, "failed to remove credential");
            }
        }
    }
}

impl CredentialProvider for SessionCredentials {
    fn token(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin(async move {
            let mut cache = self.cache.lock().await;
            self.loaded(&mut cache).await.access
        })
    }

    fn refresh(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin(self.refresh_session())
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
