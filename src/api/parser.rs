// src/api/parser.rs
//! Routes response statuses into errors and decodes success bodies.

use super::transport::ApiResponse;
use crate::constants::BODY_PREVIEW_LENGTH;
use crate::error::{ApiError, NotionError, ResourceKind, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// How an endpoint reports protocol errors.
///
/// `Sentinel` endpoints map 400/401/404/429 to fixed sentinel variants
/// (with any readable body attached). `Structured` endpoints surface a
/// readable error body as `NotionError::Api` and fall back to the
/// sentinels only when the body cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    Sentinel,
    Structured,
}

/// Static description of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub operation: &'static str,
    pub resource: ResourceKind,
    pub policy: ErrorPolicy,
}

impl Endpoint {
    pub const fn sentinel(operation: &'static str, resource: ResourceKind) -> Self {
        Self {
            operation,
            resource,
            policy: ErrorPolicy::Sentinel,
        }
    }

    pub const fn structured(operation: &'static str, resource: ResourceKind) -> Self {
        Self {
            operation,
            resource,
            policy: ErrorPolicy::Structured,
        }
    }
}

/// Decodes a success body or converts the status into an error.
pub fn parse_api_response<T>(response: ApiResponse<String>, endpoint: Endpoint) -> Result<T>
where
    T: DeserializeOwned,
{
    if response.status.is_success() {
        decode_body(&response.data, &response.url, endpoint.operation)
    } else {
        Err(classify_error(response, endpoint))
    }
}

fn decode_body<T>(body: &str, url: &str, operation: &'static str) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|source| {
        log::error!("Failed to parse {} response from {}: {}", operation, url, source);
        NotionError::Decode {
            operation,
            source,
            body_preview: preview(body),
        }
    })
}

/// Decodes an already-parsed JSON value, with the same error context.
pub fn decode_value<T>(value: Value, operation: &'static str) -> Result<T>
where
    T: DeserializeOwned,
{
    let body_preview = preview(&value.to_string());
    serde_json::from_value(value).map_err(|source| {
        log::error!("Failed to decode {} result: {}", operation, source);
        NotionError::Decode {
            operation,
            source,
            body_preview,
        }
    })
}

/// Serializes a request body.
pub fn encode_body<B>(body: &B, operation: &'static str) -> Result<String>
where
    B: serde::Serialize + ?Sized,
{
    serde_json::to_string(body).map_err(|source| NotionError::Encode { operation, source })
}

fn classify_error(response: ApiResponse<String>, endpoint: Endpoint) -> NotionError {
    let status = response.status;
    log::warn!(
        "{} failed with HTTP {} ({})",
        endpoint.operation,
        status,
        response.url
    );

    let body = read_error_body(&response.data, status);
    match (endpoint.policy, body) {
        (ErrorPolicy::Structured, Some(err)) => NotionError::Api(err),
        (_, body) => match status {
            StatusCode::BAD_REQUEST => NotionError::BadRequest(body),
            StatusCode::UNAUTHORIZED => NotionError::Unauthorized(body),
            StatusCode::NOT_FOUND => NotionError::NotFound {
                resource: endpoint.resource,
                detail: body,
            },
            StatusCode::TOO_MANY_REQUESTS => NotionError::RateLimited(body),
            _ => match body {
                Some(err) => NotionError::Api(err),
                None => NotionError::UnexpectedStatus {
                    status,
                    body: preview(&response.data),
                },
            },
        },
    }
}

fn read_error_body(body: &str, status: StatusCode) -> Option<ApiError> {
    let mut err: ApiError = serde_json::from_str(body).ok()?;
    if err.status == 0 {
        err.status = status.as_u16();
    }
    Some(err)
}

fn preview(body: &str) -> String {
    match body.char_indices().nth(BODY_PREVIEW_LENGTH) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}
