//! Payload bodies of the individual block kinds.

use super::block::Block;
use super::common::is_false;
use super::property_value::{ExternalFile, FileSource, HostedFile};
use super::rich_text::RichTextItem;
use crate::types::Color;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body shared by paragraphs, list items, quotes, toggles and templates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichTextItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl TextBlock {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            rich_text: vec![RichTextItem::plain_text(text)],
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Heading {
    #[serde(default)]
    pub rich_text: Vec<RichTextItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_toggleable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToDo {
    #[serde(default)]
    pub rich_text: Vec<RichTextItem>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Callout {
    #[serde(default)]
    pub rich_text: Vec<RichTextItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    External { external: ExternalFile },
    File { file: HostedFile },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Code {
    #[serde(default)]
    pub rich_text: Vec<RichTextItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<RichTextItem>,
    #[serde(default)]
    pub language: String,
}

/// Body of `child_page` and `child_database`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChildTitle {
    #[serde(default)]
    pub title: String,
}

/// Body of `embed` and `link_preview`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlTarget {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<RichTextItem>,
}

/// Body of `image`, `video`, `file` and `pdf`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Media {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<RichTextItem>,
    #[serde(flatten)]
    pub source: Option<FileSource>,
}

impl<'de> Deserialize<'de> for Media {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Captioned {
            #[serde(default)]
            caption: Vec<RichTextItem>,
        }

        let raw = Value::deserialize(deserializer)?;
        let source = FileSource::from_tagged(&raw).map_err(<D::Error as de::Error>::custom)?;
        let Captioned { caption } =
            Captioned::deserialize(&raw).map_err(<D::Error as de::Error>::custom)?;
        Ok(Self { caption, source })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EquationBlock {
    #[serde(default)]
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableOfContents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// Body of `column_list` and `column`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Container {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SyncedBlock {
    /// `None` marks the original; copies point at it.
    #[serde(default)]
    pub synced_from: Option<SyncedFrom>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncedFrom {
    BlockId { block_id: String },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub table_width: u32,
    #[serde(default)]
    pub has_column_header: bool,
    #[serde(default)]
    pub has_row_header: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<Vec<RichTextItem>>,
}
