//! notion-api library: a typed, blocking client for the Notion REST API.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `NotionError`, `ApiError`, `ErrorCode`, `ValidationError`
//! - **Configuration**: `ClientConfig`, `ApiKey`
//! - **Domain model**: `User`, `Database`, `Page`, `Block`, property values and schemas
//! - **Query types**: `Filter`, `Sort`, `SearchFilter`, `SearchSort`
//! - **API client**: `NotionClient` over a pluggable `Transport`
//! - **Test support**: `mock::MockServer`, `mock::StubTransport`
//! - **Formatting**: `formatting::markdown::render_blocks`

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatting;
pub mod mock;
pub mod model;
pub mod types;

// --- Error Handling ---
pub use crate::error::{ApiError, ErrorCode, NotionError, ResourceKind, Result};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::ClientConfig;
pub use crate::types::ApiKey;

// --- Domain Model ---
pub use crate::model::{
    Block, BlockContent, BlockKind, Database, Meta, ObjectKind, Page, PaginatedResponse, Parent,
    PropertyData, PropertyMetadata, PropertySchema, PropertyValue, RichTextItem, SearchResult,
    User, UserKind,
};

// --- Query Types ---
pub use crate::model::{Filter, SearchFilter, SearchObject, SearchSort, Sort, SortDirection};

// --- Domain Types ---
pub use crate::types::{Color, Date, Timestamp};

// --- API Client ---
pub use crate::api::{ApiRequest, ApiResponse, HttpTransport, NotionClient, Transport};
