//! Typed object model of the API.
//!
//! Every polymorphic object is a sum type whose variant is chosen by the
//! wire `type` tag; only the matching payload exists on the value.

mod block;
pub mod blocks;
mod common;
mod database;
mod filter;
mod page;
mod property_value;
mod rich_text;
mod search;
mod user;

pub use block::{Block, BlockContent, BlockKind};
pub use blocks::*;
pub use common::*;
pub(crate) use common::is_false;
pub use database::*;
pub use filter::*;
pub use page::Page;
pub use property_value::*;
pub use rich_text::*;
pub use search::SearchResult;
pub use user::*;

use serde::{Deserialize, Serialize};

/// One page of a cursor-paginated list.
///
/// `next_cursor` is present exactly when `has_more` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<ObjectKind>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(results: Vec<T>, next_cursor: Option<String>) -> Self {
        Self {
            object: Some(ObjectKind::List),
            has_more: next_cursor.is_some(),
            results,
            next_cursor,
        }
    }
}
