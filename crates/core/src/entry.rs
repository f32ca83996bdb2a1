// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outbox entries: one queued mutation each.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{self, RequestBody};
use crate::error::{Error, Result};

/// HTTP methods that mutate server state and may be queued.
///
/// GET is never queued: reads are retried by the caller or served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxMethod {
    Post,
    Put,
    Patch,
    Delete,
}

impl OutboxMethod {
    /// Returns the lowercase name used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxMethod::Post => "post",
            OutboxMethod::Put => "put",
            OutboxMethod::Patch => "patch",
            OutboxMethod::Delete => "delete",
        }
    }

    /// Returns the uppercase HTTP method name.
    pub fn http_name(&self) -> &'static str {
        match self {
            OutboxMethod::Post => "POST",
            OutboxMethod::Put => "PUT",
            OutboxMethod::Patch => "PATCH",
            OutboxMethod::Delete => "DELETE",
        }
    }

    /// Maps an HTTP method name to a queueable method.
    ///
    /// Returns `None` for GET, HEAD, OPTIONS and anything else that is not a
    /// mutation.
    pub fn from_http_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}

impl fmt::Display for OutboxMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutboxMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "post" => Ok(OutboxMethod::Post),
            "put" => Ok(OutboxMethod::Put),
            "patch" => Ok(OutboxMethod::Patch),
            "delete" => Ok(OutboxMethod::Delete),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// A queued mutation awaiting delivery.
///
/// Serialized with camelCase keys; the outbox is persisted as a JSON array
/// of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    /// Unique identifier assigned at enqueue time.
    pub id: String,
    pub method: OutboxMethod,
    /// Resource path, relative to the API base.
    pub url: String,
    /// Encoded body (see [`codec`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// String-valued headers captured at enqueue time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
    /// Reserved for retry accounting; written as 0 and not used to gate replay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
}

impl OutboxEntry {
    /// Creates a new entry, encoding the body for storage.
    pub fn new(
        id: String,
        method: OutboxMethod,
        url: impl Into<String>,
        body: Option<&RequestBody>,
        headers: Option<BTreeMap<String, String>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        OutboxEntry {
            id,
            method,
            url: url.into(),
            body: body.map(codec::encode),
            headers,
            created_at,
            attempt: Some(0),
        }
    }

    /// Returns the body decoded back into a request body.
    pub fn decoded_body(&self) -> Option<RequestBody> {
        self.body.clone().map(codec::decode)
    }

    /// Short human-readable description, e.g. `POST /patients`.
    pub fn summary(&self) -> String {
        format!("{} {}", self.method.http_name(), self.url)
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
