// src/mock/mod.rs
//! Test support: in-memory transports that never touch the network.
//!
//! `MockServer` emulates a small slice of the service with real state and
//! authentication. `StubTransport` replays canned responses and records
//! what it was sent.

mod server;
mod stub;

pub use server::{MockServer, MockTransport};
pub use stub::StubTransport;

use crate::api::ApiResponse;
use crate::error::{ApiError, ErrorCode};
use reqwest::StatusCode;
use serde::Serialize;

fn json_response<T>(url: String, status: StatusCode, body: &T) -> ApiResponse<String>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_string(body) {
        Ok(data) => ApiResponse { data, status, url },
        Err(e) => error_response(
            url,
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            e.to_string(),
        ),
    }
}

/// A response carrying the service's structured error body.
fn error_response(
    url: String,
    status: StatusCode,
    code: ErrorCode,
    message: String,
) -> ApiResponse<String> {
    let body = ApiError::new(status, code, message);
    ApiResponse {
        data: serde_json::to_string(&body).unwrap_or_default(),
        status,
        url,
    }
}
