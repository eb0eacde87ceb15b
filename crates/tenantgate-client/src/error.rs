//! Mapping of HTTP failures onto [`AppError`] kinds.
//!
//! The session lifecycle decides what to do from the error kind alone:
//! `Authentication` triggers a refresh, `ExternalService` and
//! `ServiceUnavailable` get one retry, everything else is surfaced.

use reqwest::{Response, StatusCode};
use serde_json::Value;

use tenantgate_core::error::{AppError, ErrorKind};

/// Map a transport-level failure.
pub fn from_transport(err: reqwest::Error) -> AppError {
    let kind = if err.is_timeout() || err.is_connect() {
        ErrorKind::ServiceUnavailable
    } else if err.is_decode() {
        ErrorKind::Serialization
    } else {
        ErrorKind::ExternalService
    };
    let message = match err.url() {
        Some(url) => format!("Request to {url} failed"),
        None => "Request failed".to_string(),
    };
    AppError::with_source(kind, message, err)
}

/// Map a non-success status and its body.
pub fn from_status(status: StatusCode, body: &str) -> AppError {
    let detail = error_detail(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string()
    });
    let message = format!("{} ({})", detail, status.as_u16());

    match status {
        StatusCode::UNAUTHORIZED => AppError::unauthorized(message),
        StatusCode::FORBIDDEN => AppError::forbidden(message),
        StatusCode::NOT_FOUND => AppError::not_found(message),
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => AppError::service_unavailable(message),
        s if s.is_server_error() => AppError::external_service(message),
        _ => AppError::validation(message),
    }
}

/// Turn a non-success response into an error, reading its body.
pub async fn from_response(response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    from_status(status, &body)
}

/// Pull a human-readable message out of a JSON error body.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|field| value.get(field).and_then(Value::as_str))
        .map(str::to_string)
}
