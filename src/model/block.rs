use super::blocks::*;
use super::common::{BlockCommon, EmptyObject, Meta, ObjectKind, Parent};
use super::rich_text::RichTextItem;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A unit of page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(flatten)]
    pub common: BlockCommon,
    #[serde(flatten)]
    pub content: BlockContent,
}

/// The typed body of a block, or the tag of a kind this client does not model.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Known(BlockKind),
    /// Any tag outside `BlockKind::TYPE_NAMES`, including the service's
    /// own `"unsupported"`.
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph {
        paragraph: TextBlock,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        heading_1: Heading,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        heading_2: Heading,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        heading_3: Heading,
    },
    BulletedListItem {
        bulleted_list_item: TextBlock,
    },
    NumberedListItem {
        numbered_list_item: TextBlock,
    },
    ToDo {
        to_do: ToDo,
    },
    Toggle {
        toggle: TextBlock,
    },
    Quote {
        quote: TextBlock,
    },
    Callout {
        callout: Callout,
    },
    Code {
        code: Code,
    },
    Equation {
        equation: EquationBlock,
    },
    ChildPage {
        child_page: ChildTitle,
    },
    ChildDatabase {
        child_database: ChildTitle,
    },
    Embed {
        embed: UrlTarget,
    },
    Bookmark {
        bookmark: Bookmark,
    },
    LinkPreview {
        link_preview: UrlTarget,
    },
    Image {
        image: Media,
    },
    Video {
        video: Media,
    },
    File {
        file: Media,
    },
    Pdf {
        pdf: Media,
    },
    Divider {
        #[serde(default)]
        divider: EmptyObject,
    },
    Breadcrumb {
        #[serde(default)]
        breadcrumb: EmptyObject,
    },
    TableOfContents {
        #[serde(default)]
        table_of_contents: TableOfContents,
    },
    ColumnList {
        #[serde(default)]
        column_list: Container,
    },
    Column {
        #[serde(default)]
        column: Container,
    },
    LinkToPage {
        link_to_page: Parent,
    },
    SyncedBlock {
        synced_block: SyncedBlock,
    },
    Table {
        table: Table,
    },
    TableRow {
        table_row: TableRow,
    },
    Template {
        template: TextBlock,
    },
}

impl BlockKind {
    /// Every tag this enum decodes, in declaration order.
    pub const TYPE_NAMES: &'static [&'static str] = &[
        "paragraph",
        "heading_1",
        "heading_2",
        "heading_3",
        "bulleted_list_item",
        "numbered_list_item",
        "to_do",
        "toggle",
        "quote",
        "callout",
        "code",
        "equation",
        "child_page",
        "child_database",
        "embed",
        "bookmark",
        "link_preview",
        "image",
        "video",
        "file",
        "pdf",
        "divider",
        "breadcrumb",
        "table_of_contents",
        "column_list",
        "column",
        "link_to_page",
        "synced_block",
        "table",
        "table_row",
        "template",
    ];

    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Heading1 { .. } => "heading_1",
            BlockKind::Heading2 { .. } => "heading_2",
            BlockKind::Heading3 { .. } => "heading_3",
            BlockKind::BulletedListItem { .. } => "bulleted_list_item",
            BlockKind::NumberedListItem { .. } => "numbered_list_item",
            BlockKind::ToDo { .. } => "to_do",
            BlockKind::Toggle { .. } => "toggle",
            BlockKind::Quote { .. } => "quote",
            BlockKind::Callout { .. } => "callout",
            BlockKind::Code { .. } => "code",
            BlockKind::Equation { .. } => "equation",
            BlockKind::ChildPage { .. } => "child_page",
            BlockKind::ChildDatabase { .. } => "child_database",
            BlockKind::Embed { .. } => "embed",
            BlockKind::Bookmark { .. } => "bookmark",
            BlockKind::LinkPreview { .. } => "link_preview",
            BlockKind::Image { .. } => "image",
            BlockKind::Video { .. } => "video",
            BlockKind::File { .. } => "file",
            BlockKind::Pdf { .. } => "pdf",
            BlockKind::Divider { .. } => "divider",
            BlockKind::Breadcrumb { .. } => "breadcrumb",
            BlockKind::TableOfContents { .. } => "table_of_contents",
            BlockKind::ColumnList { .. } => "column_list",
            BlockKind::Column { .. } => "column",
            BlockKind::LinkToPage { .. } => "link_to_page",
            BlockKind::SyncedBlock { .. } => "synced_block",
            BlockKind::Table { .. } => "table",
            BlockKind::TableRow { .. } => "table_row",
            BlockKind::Template { .. } => "template",
        }
    }

    /// The text runs of kinds that carry one.
    pub fn rich_text(&self) -> Option<&[RichTextItem]> {
        match self {
            BlockKind::Paragraph { paragraph: body }
            | BlockKind::BulletedListItem {
                bulleted_list_item: body,
            }
            | BlockKind::NumberedListItem {
                numbered_list_item: body,
            }
            | BlockKind::Toggle { toggle: body }
            | BlockKind::Quote { quote: body }
            | BlockKind::Template { template: body } => Some(&body.rich_text),
            BlockKind::Heading1 { heading_1: h }
            | BlockKind::Heading2 { heading_2: h }
            | BlockKind::Heading3 { heading_3: h } => Some(&h.rich_text),
            BlockKind::ToDo { to_do } => Some(&to_do.rich_text),
            BlockKind::Callout { callout } => Some(&callout.rich_text),
            BlockKind::Code { code } => Some(&code.rich_text),
            _ => None,
        }
    }

    /// Nested blocks carried inline (create payloads and synced copies).
    pub fn children(&self) -> &[Block] {
        match self {
            BlockKind::Paragraph { paragraph: body }
            | BlockKind::BulletedListItem {
                bulleted_list_item: body,
            }
            | BlockKind::NumberedListItem {
                numbered_list_item: body,
            }
            | BlockKind::Toggle { toggle: body }
            | BlockKind::Quote { quote: body }
            | BlockKind::Template { template: body } => &body.children,
            BlockKind::Heading1 { heading_1: h }
            | BlockKind::Heading2 { heading_2: h }
            | BlockKind::Heading3 { heading_3: h } => &h.children,
            BlockKind::ToDo { to_do } => &to_do.children,
            BlockKind::Callout { callout } => &callout.children,
            BlockKind::ColumnList { column_list: c } | BlockKind::Column { column: c } => {
                &c.children
            }
            BlockKind::SyncedBlock { synced_block } => &synced_block.children,
            BlockKind::Table { table } => &table.children,
            _ => &[],
        }
    }
}

impl Serialize for BlockContent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            BlockContent::Known(kind) => kind.serialize(serializer),
            BlockContent::Unsupported(block_type) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", block_type)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for BlockContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let block_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| de::Error::missing_field("type"))?
            .to_string();

        if !BlockKind::TYPE_NAMES.contains(&block_type.as_str()) {
            return Ok(BlockContent::Unsupported(block_type));
        }
        BlockKind::deserialize(value)
            .map(BlockContent::Known)
            .map_err(de::Error::custom)
    }
}

impl Block {
    /// A new block for append or create payloads.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            common: BlockCommon {
                meta: Meta {
                    object: Some(ObjectKind::Block),
                    id: String::new(),
                },
                ..BlockCommon::default()
            },
            content: BlockContent::Known(kind),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph {
            paragraph: TextBlock::plain(text),
        })
    }

    pub fn heading_1(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Heading1 {
            heading_1: Heading {
                rich_text: vec![RichTextItem::plain_text(text)],
                ..Heading::default()
            },
        })
    }

    pub fn bulleted_list_item(text: impl Into<String>) -> Self {
        Self::new(BlockKind::BulletedListItem {
            bulleted_list_item: TextBlock::plain(text),
        })
    }

    pub fn to_do(text: impl Into<String>, checked: bool) -> Self {
        Self::new(BlockKind::ToDo {
            to_do: ToDo {
                rich_text: vec![RichTextItem::plain_text(text)],
                checked,
                ..ToDo::default()
            },
        })
    }

    pub fn code(source: impl Into<String>, language: impl Into<String>) -> Self {
        Self::new(BlockKind::Code {
            code: Code {
                rich_text: vec![RichTextItem::plain_text(source)],
                caption: Vec::new(),
                language: language.into(),
            },
        })
    }

    pub fn divider() -> Self {
        Self::new(BlockKind::Divider {
            divider: EmptyObject {},
        })
    }

    pub fn id(&self) -> &str {
        &self.common.meta.id
    }

    pub fn kind(&self) -> Option<&BlockKind> {
        match &self.content {
            BlockContent::Known(kind) => Some(kind),
            BlockContent::Unsupported(_) => None,
        }
    }

    /// The wire `type` tag, preserved verbatim for unsupported kinds.
    pub fn block_type(&self) -> &str {
        match &self.content {
            BlockContent::Known(kind) => kind.type_name(),
            BlockContent::Unsupported(tag) => tag,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self.content, BlockContent::Unsupported(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn block_json(block_type: &str, payload: Value) -> Value {
        let mut value = json!({
            "object": "block",
            "id": "9bc30ad4-9373-46a5-84ab-0a7845ee52e6",
            "created_time": "2021-03-16T16:31:00.000Z",
            "last_edited_time": "2021-03-16T16:32:00.000Z",
            "has_children": false,
            "archived": false,
            "type": block_type,
        });
        value[block_type] = payload;
        value
    }

    #[test]
    fn decodes_known_kind_with_header() {
        let block: Block = serde_json::from_value(block_json(
            "heading_2",
            json!({"rich_text": [{"type": "text", "text": {"content": "Lacinato kale"}}], "color": "default"}),
        ))
        .unwrap();

        assert_eq!(block.id(), "9bc30ad4-9373-46a5-84ab-0a7845ee52e6");
        assert_eq!(block.block_type(), "heading_2");
        assert!(!block.common.created_time.is_zero());
        match block.kind() {
            Some(BlockKind::Heading2 { heading_2 }) => {
                assert_eq!(heading_2.rich_text[0].text(), "Lacinato kale")
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn media_source_is_decoded_strictly() {
        let image: Block = serde_json::from_value(block_json(
            "image",
            json!({"type": "external", "external": {"url": "https://example.com/kale.png"}}),
        ))
        .unwrap();
        match image.kind() {
            Some(BlockKind::Image { image }) => assert_eq!(
                image.source.as_ref().map(|s| s.url()),
                Some("https://example.com/kale.png")
            ),
            other => panic!("unexpected kind: {:?}", other),
        }

        let broken = serde_json::from_value::<Block>(block_json(
            "image",
            json!({"type": "external", "external": {}}),
        ));
        assert!(broken.is_err());
    }

    #[test]
    fn unknown_kind_keeps_original_tag() {
        let block: Block =
            serde_json::from_value(block_json("ai_block", json!({"prompt": "summarize"}))).unwrap();
        assert!(block.is_unsupported());
        assert_eq!(block.block_type(), "ai_block");

        let encoded = serde_json::to_value(&block).unwrap();
        assert_eq!(encoded["type"], "ai_block");
        assert_eq!(encoded["id"], "9bc30ad4-9373-46a5-84ab-0a7845ee52e6");
    }

    #[test]
    fn service_unsupported_tag_is_unsupported() {
        let block: Block =
            serde_json::from_value(block_json("unsupported", json!({}))).unwrap();
        assert_eq!(block.content, BlockContent::Unsupported("unsupported".into()));
    }

    #[test]
    fn malformed_known_payload_still_fails() {
        let result = serde_json::from_value::<Block>(block_json("to_do", json!({"checked": "yes"})));
        assert!(result.is_err());
    }

    #[test]
    fn type_names_cover_every_variant() {
        for name in BlockKind::TYPE_NAMES {
            let payload = match *name {
                "embed" | "link_preview" | "bookmark" => json!({"url": "https://example.com"}),
                "link_to_page" => json!({"type": "page_id", "page_id": "p1"}),
                _ => json!({}),
            };
            let block: Block = serde_json::from_value(block_json(name, payload)).unwrap();
            assert_eq!(block.block_type(), *name);
            assert!(!block.is_unsupported(), "{}", name);
        }
    }

    #[test]
    fn encodes_new_block_without_server_fields() {
        let block = Block::to_do("Ship it", true);
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "object": "block",
                "type": "to_do",
                "to_do": {
                    "rich_text": [{"type": "text", "text": {"content": "Ship it"}, "plain_text": "Ship it"}],
                    "checked": true
                }
            })
        );
    }
}
