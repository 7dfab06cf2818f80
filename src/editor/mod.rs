//! Rich-text editing for the project body
//!
//! The document model and its markup codec sit behind [`RichTextEditor`],
//! which is the only writer of serialized body markup.

mod adapter;
mod document;
mod markup;

pub use adapter::RichTextEditor;
pub use document::{Block, BlockKind, Command, Document, Marks, Position};
pub use markup::{parse, text_length};
