use crate::routing_utils::BasicErrorResponse;
use axum::body::{self, Body};
use axum::http::StatusCode;
use axum::response::Response;
use serde::de::DeserializeOwned;

/// Reads a whole response body and parses it as JSON. Fails the test with the raw body text
/// when it doesn't match the requested shape.
pub async fn deserialize_body<T: DeserializeOwned>(response_body: Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("response body should be readable");

    match serde_json::from_slice(&bytes) {
        Ok(parsed) => parsed,
        Err(err) => panic!(
            "response body did not have the expected shape ({err}): {}",
            String::from_utf8_lossy(&bytes)
        ),
    }
}

/// Checks a failed request's status and returns its `{error_code, error}` body
pub async fn error_body(response: Response, expected_status: StatusCode) -> BasicErrorResponse {
    assert_eq!(expected_status, response.status());
    deserialize_body(response.into_body()).await
}
