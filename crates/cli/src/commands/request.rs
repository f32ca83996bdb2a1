// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `obx enqueue` and `obx send`.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use ob_client::{ApiClient, ApiRequest, Dispatch, Method};
use ob_core::{FileRef, Multipart, OutboxMethod, RequestBody};

use crate::cli::RequestArgs;
use crate::error::{Error, Result};

use super::Context;

pub async fn enqueue(ctx: &Context, args: &RequestArgs) -> Result<()> {
    let method = OutboxMethod::from_str(&args.method)?;
    let body = parse_body(args)?;
    let headers = parse_headers(&args.headers)?;
    let headers = (!headers.is_empty()).then(|| headers.into_iter().collect::<BTreeMap<_, _>>());

    let entry = ctx
        .outbox
        .enqueue(method, args.url.as_str(), body.as_ref(), headers)
        .await?;
    println!("Queued {} ({})", entry.id, entry.summary());
    Ok(())
}

pub async fn send(ctx: &Context, args: &RequestArgs, offline: bool) -> Result<()> {
    let mut request = ApiRequest::new(parse_method(&args.method)?, args.url.as_str()).body(parse_body(args)?);
    for (name, value) in parse_headers(&args.headers)? {
        request = request.try_header(&name, &value)?;
    }

    let transport = ctx.transport()?;
    let credentials = ctx.credentials(transport.clone());
    let client = ApiClient::new(transport, credentials, ctx.connectivity(offline)?, ctx.outbox.clone());

    match client.send(request).await? {
        Dispatch::Sent(response) => {
            println!("{}", response.status);
            if let Some(body) = response.body {
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
        }
        Dispatch::Queued(entry) => {
            println!("Offline: queued {} ({})", entry.id, entry.summary());
        }
    }
    Ok(())
}

/// Parses a method for `send`: GET or any queueable mutation.
pub(crate) fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .ok()
        .filter(|m| *m == Method::GET || OutboxMethod::from_http_name(m.as_str()).is_some())
        .ok_or_else(|| Error::InvalidMethod(method.to_string()))
}

/// Build the request body from `--data`, or from `--field` / `--file`.
pub(crate) fn parse_body(args: &RequestArgs) -> Result<Option<RequestBody>> {
    if let Some(data) = &args.data {
        let value = serde_json::from_str(data)
            .map_err(|e| Error::InvalidInput(format!("--data is not valid JSON: {e}")))?;
        return Ok(Some(RequestBody::Json(value)));
    }
    if args.field.is_empty() && args.file.is_empty() {
        return Ok(None);
    }

    let mut form = Multipart::new();
    for field in &args.field {
        let (name, value) = split_pair(field, "--field")?;
        form.append(name, value);
    }
    for file in &args.file {
        let (name, path) = split_pair(file, "--file")?;
        form.append(name, file_ref(Path::new(path))?);
    }
    Ok(Some(RequestBody::Multipart(form)))
}

fn file_ref(path: &Path) -> Result<FileRef> {
    let absolute = std::fs::canonicalize(path)
        .map_err(|e| Error::InvalidInput(format!("cannot use file {}: {e}", path.display())))?;
    let mut file = FileRef::new(format!("file://{}", absolute.display()));
    if let Some(name) = absolute.file_name() {
        file = file.with_name(name.to_string_lossy());
    }
    Ok(file)
}

fn split_pair<'a>(pair: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    match pair.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(Error::InvalidInput(format!("{flag} expects NAME=VALUE, got '{pair}'"))),
    }
}

/// Parse `Name: value` header arguments.
pub(crate) fn parse_headers(headers: &[String]) -> Result<Vec<(String, String)>> {
    headers
        .iter()
        .map(|header| match header.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(Error::InvalidInput(format!("header must look like 'Name: value', got '{header}'"))),
        })
        .collect()
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
