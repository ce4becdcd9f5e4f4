// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use yare::parameterized;

#[parameterized(
    ok = { 200, true },
    created = { 201, true },
    accepted = { 202, true },
)]
fn success_statuses_pass(code: u16, ok: bool) {
    let status = StatusCode::from_u16(code).unwrap();
    assert_eq!(classify(status, "").is_ok(), ok);
}

#[parameterized(
    unauthorized = { 401 },
    forbidden = { 403 },
)]
fn auth_statuses_are_unauthorized(code: u16) {
    let status = StatusCode::from_u16(code).unwrap();
    assert!(matches!(classify(status, ""), Err(SubmitError::Unauthorized)));
}

#[parameterized(
    request_timeout = { 408 },
    throttled = { 429 },
    internal = { 500 },
    bad_gateway = { 502 },
    unavailable = { 503 },
)]
fn transient_statuses_are_connectivity(code: u16) {
    let status = StatusCode::from_u16(code).unwrap();
    let err = classify(status, "").unwrap_err();
    assert!(err.is_connectivity(), "{code} should be retried: {err}");
}

#[test]
fn client_errors_are_rejections_with_message() {
    let err = classify(
        StatusCode::BAD_REQUEST,
        r#"{"message":"Unknown product code"}"#,
    )
    .unwrap_err();

    match err {
        SubmitError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Unknown product code");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[parameterized(
    message_field = { r#"{"message":"bad"}"#, "bad" },
    error_field = { r#"{"error":"nope"}"#, "nope" },
    problem_title = { r#"{"title":"One or more validation errors occurred."}"#, "One or more validation errors occurred." },
    plain_text = { "  quantity must be positive \n", "quantity must be positive" },
    empty = { "", "no details" },
)]
fn rejection_message_extraction(body: &str, expected: &str) {
    assert_eq!(rejection_message(body), expected);
}

#[parameterized(
    bare = { "http://localhost:5000", "http://localhost:5000/api/scans" },
    trailing_slash = { "http://localhost:5000/", "http://localhost:5000/api/scans" },
    prefixed = { "https://inv.example.com/v2", "https://inv.example.com/v2/api/scans" },
)]
fn endpoint_is_joined_to_base(base: &str, expected: &str) {
    assert_eq!(endpoint_url(base), expected);
}

#[tokio::test]
async fn unreachable_server_is_connectivity() {
    let auth: Arc<dyn AuthProvider> = Arc::new(crate::hub::TokenStore::new(None));
    let submitter =
        HttpSubmitter::new("http://127.0.0.1:1", Duration::from_secs(5), auth).unwrap();

    let err = submitter
        .submit(&OpId::from("op-1"), &serde_json::json!({"productCode": "A"}))
        .await
        .unwrap_err();

    assert!(err.is_connectivity());
}
