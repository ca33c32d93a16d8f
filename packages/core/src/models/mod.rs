//! Data Models
//!
//! This module contains the document tree structures used throughout
//! Penmark:
//!
//! - `Block` / `BlockKind` - closed tagged-union block node model
//! - `Inline` / `Mark` - inline text leaves and their decorations
//! - Content-model registry - per-type child constraints with validation
//!   and repair

mod content;
mod node;

pub use content::{
    content_rule, is_top_level, repair_fragment, validate_block, validate_document, ContentRule,
    ModelError,
};
pub use node::{
    fragment_plain_text, normalize_marks, Alignment, Block, BlockId, BlockKind, CalloutKind,
    ImageAttrs, Inline, Mark,
};
