use super::common::Meta;
use super::property_value::DateRange;
use super::user::User;
use crate::types::Color;
use serde::{Deserialize, Serialize};

/// One formatted run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextItem {
    #[serde(flatten)]
    pub kind: RichTextKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub plain_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextKind {
    Text { text: TextContent },
    Mention { mention: Mention },
    Equation { equation: Equation },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Equation {
    pub expression: String,
}

/// Inline reference to another object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mention {
    User { user: User },
    Page { page: Meta },
    Database { database: Meta },
    Date { date: DateRange },
    LinkPreview { link_preview: LinkPreview },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPreview {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
    #[serde(default)]
    pub color: Color,
}

impl RichTextItem {
    /// Creates a plain text run with no annotations.
    pub fn plain_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind: RichTextKind::Text {
                text: TextContent {
                    content: text.clone(),
                    link: None,
                },
            },
            annotations: None,
            plain_text: text,
            href: None,
        }
    }

    /// Creates a text run pointing at `url`.
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let mut item = Self::plain_text(text);
        if let RichTextKind::Text { text } = &mut item.kind {
            text.link = Some(Link { url: url.clone() });
        }
        item.href = Some(url);
        item
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    /// The unformatted text, falling back to the payload when the server
    /// did not fill `plain_text` (caller-built runs).
    pub fn text(&self) -> &str {
        if !self.plain_text.is_empty() {
            return &self.plain_text;
        }
        match &self.kind {
            RichTextKind::Text { text } => &text.content,
            RichTextKind::Equation { equation } => &equation.expression,
            RichTextKind::Mention { .. } => "",
        }
    }

    /// The link target, from `href` or from the text payload.
    pub fn link_url(&self) -> Option<&str> {
        self.href.as_deref().or(match &self.kind {
            RichTextKind::Text { text } => text.link.as_ref().map(|l| l.url.as_str()),
            _ => None,
        })
    }
}

/// Concatenates the plain text of every run.
pub fn plain_text_of(items: &[RichTextItem]) -> String {
    items.iter().map(RichTextItem::text).collect()
}
