// src/formatting/mod.rs
//! Renders API objects into text formats.

pub mod markdown;

pub use self::markdown::{render_blocks, RenderError};
