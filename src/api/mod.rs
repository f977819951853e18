// src/api/mod.rs
//! Notion API interaction.
//!
//! Requests are composed by `NotionClient`, moved by a `Transport`, and
//! their responses routed through the parser, with clear separation
//! between I/O, status handling and decoding.

pub mod client;
mod pagination;
pub mod parser;
pub mod transport;

pub use client::NotionClient;
pub use pagination::fetch_all_pages;
pub use parser::{Endpoint, ErrorPolicy};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
