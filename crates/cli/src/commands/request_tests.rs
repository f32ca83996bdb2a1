// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use ob_core::PartValue;
use serde_json::json;
use tempfile::TempDir;
use yare::parameterized;

fn args() -> RequestArgs {
    RequestArgs {
        method: "post".to_string(),
        url: "/api/patients/".to_string(),
        data: None,
        field: Vec::new(),
        file: Vec::new(),
        headers: Vec::new(),
    }
}

#[parameterized(
    get = { "get", Method::GET },
    post_upper = { "POST", Method::POST },
    put = { "put", Method::PUT },
    patch = { "Patch", Method::PATCH },
    delete = { "delete", Method::DELETE },
)]
fn test_parse_method(input: &str, expected: Method) {
    assert_eq!(parse_method(input).unwrap(), expected);
}

#[parameterized(
    head = { "head" },
    options = { "OPTIONS" },
    custom = { "purge" },
    not_a_token = { "po st" },
    empty = { "" },
)]
fn test_parse_method_rejects_unknown(input: &str) {
    assert!(matches!(parse_method(input), Err(Error::InvalidMethod(_))));
}

#[test]
fn test_no_body_flags_means_no_body() {
    assert_eq!(parse_body(&args()).unwrap(), None);
}

#[test]
fn test_data_is_json_body() {
    let mut args = args();
    args.data = Some(r#"{"name":"Alice","age":0}"#.to_string());
    assert_eq!(
        parse_body(&args).unwrap(),
        Some(RequestBody::Json(json!({"name": "Alice", "age": 0})))
    );
}

#[test]
fn test_invalid_data_is_rejected() {
    let mut args = args();
    args.data = Some("{oops".to_string());
    assert!(matches!(parse_body(&args), Err(Error::InvalidInput(_))));
}

#[test]
fn test_fields_and_files_build_multipart_in_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("scan.jpg");
    std::fs::write(&path, b"jpeg").unwrap();
    let mut args = args();
    args.field = vec!["visit=42".to_string(), "note=a=b".to_string()];
    args.file = vec![format!("scan={}", path.display())];

    let Some(RequestBody::Multipart(form)) = parse_body(&args).unwrap() else {
        panic!("expected multipart body");
    };

    let parts = form.parts();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], ("visit".to_string(), PartValue::Text("42".to_string())));
    assert_eq!(parts[1], ("note".to_string(), PartValue::Text("a=b".to_string())));
    let PartValue::File(file) = &parts[2].1 else {
        panic!("expected file part");
    };
    assert!(file.uri.starts_with("file://"));
    assert!(file.uri.ends_with("scan.jpg"));
    assert_eq!(file.name.as_deref(), Some("scan.jpg"));
}

#[test]
fn test_missing_file_is_rejected() {
    let mut args = args();
    args.file = vec!["scan=/nonexistent/scan.jpg".to_string()];
    assert!(matches!(parse_body(&args), Err(Error::InvalidInput(_))));
}

#[test]
fn test_field_without_equals_is_rejected() {
    let mut args = args();
    args.field = vec!["visit".to_string()];
    let err = parse_body(&args).unwrap_err();
    assert!(err.to_string().contains("--field expects NAME=VALUE"));
}

#[test]
fn test_parse_headers() {
    let headers = parse_headers(&["X-Request-Id: abc".to_string(), "Accept:application/json".to_string()]).unwrap();
    assert_eq!(
        headers,
        vec![
            ("X-Request-Id".to_string(), "abc".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ]
    );
}

#[test]
fn test_parse_headers_rejects_missing_colon() {
    assert!(matches!(parse_headers(&["X-Request-Id abc".to_string()]), Err(Error::InvalidInput(_))));
}
