// src/formatting/markdown.rs
//! Renders a flat list of blocks as Markdown.
//!
//! Only the kinds with an obvious Markdown form are handled; anything
//! else fails the whole render rather than being silently dropped.

use crate::model::{Annotations, Block, BlockKind, RichTextItem, RichTextKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("not supported block type: {0}")]
    UnsupportedBlock(String),
}

/// Renders `blocks` in order. Consecutive list items of the same kind are
/// kept together; a list starting after another block gets a blank line.
pub fn render_blocks(blocks: &[Block]) -> Result<String, RenderError> {
    let mut out = String::new();
    let mut previous: Option<&str> = None;

    for block in blocks {
        let kind = block
            .kind()
            .ok_or_else(|| RenderError::UnsupportedBlock(block.block_type().to_string()))?;
        let starts_list = previous.is_some_and(|p| p != block.block_type());

        match kind {
            BlockKind::Heading1 { heading_1 } => {
                out.push_str("# ");
                push_rich_text(&mut out, &heading_1.rich_text);
                out.push_str("\n\n");
            }
            BlockKind::Heading2 { heading_2 } => {
                out.push_str("## ");
                push_rich_text(&mut out, &heading_2.rich_text);
                out.push_str("\n\n");
            }
            BlockKind::Heading3 { heading_3 } => {
                out.push_str("### ");
                push_rich_text(&mut out, &heading_3.rich_text);
                out.push_str("\n\n");
            }
            BlockKind::Paragraph { paragraph } => {
                push_rich_text(&mut out, &paragraph.rich_text);
                out.push_str("\n\n");
            }
            BlockKind::Quote { quote } => {
                out.push_str("> ");
                push_rich_text(&mut out, &quote.rich_text);
                out.push_str("\n\n");
            }
            BlockKind::Code { code } => {
                out.push_str("```");
                out.push_str(&code.language);
                out.push('\n');
                // Code content is verbatim; annotations would corrupt it.
                for item in &code.rich_text {
                    out.push_str(item.text());
                }
                out.push_str("\n```\n");
            }
            BlockKind::Equation { equation } => {
                out.push_str("$$\n");
                out.push_str(&equation.expression);
                out.push_str("\n$$\n\n");
            }
            BlockKind::BulletedListItem { bulleted_list_item } => {
                if starts_list {
                    out.push('\n');
                }
                out.push_str("- ");
                push_rich_text(&mut out, &bulleted_list_item.rich_text);
                out.push('\n');
            }
            BlockKind::NumberedListItem { numbered_list_item } => {
                if starts_list {
                    out.push('\n');
                }
                out.push_str("1. ");
                push_rich_text(&mut out, &numbered_list_item.rich_text);
                out.push('\n');
            }
            BlockKind::ToDo { to_do } => {
                if starts_list {
                    out.push('\n');
                }
                out.push_str(if to_do.checked { "- [x] " } else { "- [ ] " });
                push_rich_text(&mut out, &to_do.rich_text);
                out.push('\n');
            }
            BlockKind::Divider { .. } => out.push_str("\n---\n"),
            other => return Err(RenderError::UnsupportedBlock(other.type_name().to_string())),
        }

        previous = Some(block.block_type());
    }

    Ok(out)
}

fn push_rich_text(out: &mut String, items: &[RichTextItem]) {
    for item in items {
        out.push_str(&render_run(item));
    }
}

/// One run with its link and inline styles applied.
fn render_run(item: &RichTextItem) -> String {
    let mut result = match &item.kind {
        RichTextKind::Text { text } => text.content.clone(),
        RichTextKind::Equation { equation } => format!("${}$", equation.expression),
        RichTextKind::Mention { .. } => item.plain_text.clone(),
    };

    if let Some(url) = item.link_url() {
        result = format!("[{}]({})", result, url);
    }

    let styles = item.annotations.as_ref().map(style_markers).unwrap_or_default();
    for marker in styles {
        result = format!("{marker}{result}{marker}");
    }
    result
}

/// Markers from innermost to outermost.
fn style_markers(annotations: &Annotations) -> Vec<&'static str> {
    let mut markers = Vec::new();
    if annotations.code {
        markers.push("`");
    }
    if annotations.strikethrough {
        markers.push("~~");
    }
    if annotations.bold {
        markers.push("**");
    }
    if annotations.italic {
        markers.push("*");
    }
    markers
}
