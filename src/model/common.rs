use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// The `object` discriminant shared by every top-level entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    User,
    Page,
    Database,
    Block,
    List,
    PropertyItem,
    Error,
    /// The legacy tag used by older error bodies.
    Object,
    #[serde(other)]
    Unknown,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::User => "user",
            ObjectKind::Page => "page",
            ObjectKind::Database => "database",
            ObjectKind::Block => "block",
            ObjectKind::List => "list",
            ObjectKind::PropertyItem => "property_item",
            ObjectKind::Error => "error",
            ObjectKind::Object => "object",
            ObjectKind::Unknown => "unknown",
        }
    }
}

/// Minimal header embedded by every top-level entity.
///
/// Also used on its own wherever the API returns a bare reference
/// (`created_by`, relation values, page and database mentions).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<ObjectKind>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

impl Meta {
    pub fn new(object: ObjectKind, id: impl Into<String>) -> Self {
        Self {
            object: Some(object),
            id: id.into(),
        }
    }

    /// A bare `{"id": ...}` reference, as used by relation values.
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            object: None,
            id: id.into(),
        }
    }
}

/// Where a page, database or block lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parent {
    DatabaseId { database_id: String },
    PageId { page_id: String },
    BlockId { block_id: String },
    Workspace {
        #[serde(default)]
        workspace: bool,
    },
}

impl Parent {
    pub fn database(id: impl Into<String>) -> Self {
        Parent::DatabaseId {
            database_id: id.into(),
        }
    }

    pub fn page(id: impl Into<String>) -> Self {
        Parent::PageId { page_id: id.into() }
    }

    /// The parent's identifier, `None` for the workspace.
    pub fn id(&self) -> Option<&str> {
        match self {
            Parent::DatabaseId { database_id } => Some(database_id),
            Parent::PageId { page_id } => Some(page_id),
            Parent::BlockId { block_id } => Some(block_id),
            Parent::Workspace { .. } => None,
        }
    }
}

/// Payload-less variant body, `{}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmptyObject {}

/// Header fields shared by every block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockCommon {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Timestamp::is_zero")]
    pub created_time: Timestamp,
    #[serde(default, skip_serializing_if = "Timestamp::is_zero")]
    pub last_edited_time: Timestamp,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_children: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
