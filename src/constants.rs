// src/constants.rs
//! Protocol constants and operational boundaries of the client.
//!
//! Each constant is named for the concept it fixes. Values that callers
//! may want to vary at runtime are surfaced through `ClientConfig`; these
//! are its defaults.

// ---------------------------------------------------------------------------
// Wire protocol
// ---------------------------------------------------------------------------

/// Base URL of the public API. The path component is always `/v1`.
pub const API_BASE_URL: &str = "https://api.notion.com/v1";

/// Path every base URL is normalized to.
pub const API_BASE_PATH: &str = "/v1";

/// Value of the `Notion-Version` header sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Name of the protocol-version header.
pub const NOTION_VERSION_HEADER: &str = "Notion-Version";

/// Client identification sent as `User-Agent`.
pub const USER_AGENT: &str = concat!("notion-api-rs/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// How many objects are requested per page of a list endpoint. Also the
/// API maximum.
pub const DEFAULT_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// How much of an undecodable body is kept in `NotionError::Decode`.
pub const BODY_PREVIEW_LENGTH: usize = 500;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Environment variable holding the bearer token.
pub const API_KEY_ENV_VAR: &str = "NOTION_API_KEY";

/// Environment variable overriding the API host (tests, proxies).
pub const BASE_URL_ENV_VAR: &str = "NOTION_BASE_URL";
