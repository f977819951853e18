use thiserror::Error;

mod colors;
mod domain_types;
mod time;

pub use colors::*;
pub use domain_types::*;
pub use time::*;

/// Caller-side precondition failures, raised before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Invalid API key format: {reason}")]
    InvalidApiKey { reason: String },

    #[error("Parent database is not specified")]
    MissingParentDatabase,

    #[error("Database {database_id} has no title property")]
    MissingTitleProperty { database_id: String },

    #[error("Property '{key}' is not part of the parent database schema")]
    UnknownProperty { key: String },
}
