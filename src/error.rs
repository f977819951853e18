// src/error.rs
//! Error types for every failure tier of a client call.
//!
//! Transport failures come from the HTTP stack, decode failures from a body
//! that does not match the model, and protocol errors from the service
//! itself. Protocol errors are either structured (`Api`) or sentinel
//! (`BadRequest`, `NotFound`, ...). Sentinels still carry the structured
//! body when one could be read.

use crate::model::ObjectKind;
use crate::types::ValidationError;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Machine-readable error codes reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequestUrl,
    InvalidRequest,
    ValidationError,
    MissingVersion,
    Unauthorized,
    RestrictedResource,
    ObjectNotFound,
    Conflict,
    RateLimited,
    InternalServerError,
    ServiceUnavailable,
    DatabaseConnectionUnavailable,
    /// A code this client doesn't recognize yet
    Other(String),
}

impl ErrorCode {
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "invalid_json" => Self::InvalidJson,
            "invalid_request_url" => Self::InvalidRequestUrl,
            "invalid_request" => Self::InvalidRequest,
            "validation_error" => Self::ValidationError,
            "missing_version" => Self::MissingVersion,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "object_not_found" => Self::ObjectNotFound,
            "conflict_error" => Self::Conflict,
            "rate_limited" => Self::RateLimited,
            "internal_server_error" => Self::InternalServerError,
            "service_unavailable" => Self::ServiceUnavailable,
            "database_connection_unavailable" => Self::DatabaseConnectionUnavailable,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::InvalidRequestUrl => "invalid_request_url",
            Self::InvalidRequest => "invalid_request",
            Self::ValidationError => "validation_error",
            Self::MissingVersion => "missing_version",
            Self::Unauthorized => "unauthorized",
            Self::RestrictedResource => "restricted_resource",
            Self::ObjectNotFound => "object_not_found",
            Self::Conflict => "conflict_error",
            Self::RateLimited => "rate_limited",
            Self::InternalServerError => "internal_server_error",
            Self::ServiceUnavailable => "service_unavailable",
            Self::DatabaseConnectionUnavailable => "database_connection_unavailable",
            Self::Other(code) => code,
        }
    }

    /// Whether a caller could reasonably retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited
                | Self::Conflict
                | Self::InternalServerError
                | Self::ServiceUnavailable
                | Self::DatabaseConnectionUnavailable
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_api_response(&code))
    }
}

/// Structured error body: `{"object": "error", "status", "code", "message"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code} (HTTP {status}): {message}")]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<ObjectKind>,
    #[serde(default)]
    pub status: u16,
    pub code: ErrorCode,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            object: Some(ObjectKind::Error),
            status: status.as_u16(),
            code,
            message: message.into(),
            request_id: None,
        }
    }
}

/// Which kind of object a not-found sentinel refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    Database,
    Page,
    Block,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::User => "user",
            ResourceKind::Database => "database",
            ResourceKind::Page => "page",
            ResourceKind::Block => "block",
        })
    }
}

fn describe_body(body: &Option<ApiError>) -> String {
    match body {
        Some(err) => format!(": {}", err),
        None => String::new(),
    }
}

/// Every way a client call can fail.
#[derive(Error, Debug)]
pub enum NotionError {
    #[error("Network failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode the {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
        body_preview: String,
    },

    #[error("Failed to encode the {operation} request: {source}")]
    Encode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Notion API returned an error: {0}")]
    Api(ApiError),

    #[error("Bad request{}", describe_body(.0))]
    BadRequest(Option<ApiError>),

    #[error("Unauthorized{}", describe_body(.0))]
    Unauthorized(Option<ApiError>),

    #[error("Rate limit exceeded{}", describe_body(.0))]
    RateLimited(Option<ApiError>),

    #[error("The {resource} was not found{}", describe_body(.detail))]
    NotFound {
        resource: ResourceKind,
        detail: Option<ApiError>,
    },

    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("Malformed pagination in {operation}: {reason}")]
    Pagination {
        operation: &'static str,
        reason: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),
}

impl NotionError {
    /// The structured error body, whichever protocol tier carried it.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            NotionError::Api(err) => Some(err),
            NotionError::BadRequest(body)
            | NotionError::Unauthorized(body)
            | NotionError::RateLimited(body)
            | NotionError::NotFound { detail: body, .. } => body.as_ref(),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.api_error().map(|err| &err.code)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NotionError::NotFound { .. })
            || self.code().is_some_and(ErrorCode::is_not_found)
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, NotionError::RateLimited(_))
            || self.code() == Some(&ErrorCode::RateLimited)
    }
}

pub type Result<T, E = NotionError> = std::result::Result<T, E>;
