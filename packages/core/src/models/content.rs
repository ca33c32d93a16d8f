//! Content-Model Registry
//!
//! Each block type declares what it may contain; mutations and parses are
//! checked against these rules so an invalid tree never reaches the editing
//! session. The registry is a compile-time-checked match over the closed
//! [`BlockKind`] set rather than a runtime map of extension objects.
//!
//! Two entry points:
//!
//! - [`validate_document`] / [`validate_block`] reject invalid trees with a
//!   [`ModelError`] describing the first violation
//! - [`repair_fragment`] coerces arbitrary input (the Markdown parse degrade
//!   path) into a valid tree instead of rejecting it

use crate::models::node::{Block, BlockKind};
use thiserror::Error;

/// Validation errors for document tree structure
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Container '{container}' requires at least one child block")]
    EmptyContainer { container: &'static str },

    #[error("Block '{child}' is not a valid child of '{parent}'")]
    InvalidChild {
        parent: &'static str,
        child: &'static str,
    },

    #[error("Heading level {0} is out of range (1-6)")]
    InvalidHeadingLevel(u8),

    #[error("Image block has an empty source URL")]
    EmptyImageSource,

    #[error("Video embed has an empty URL")]
    EmptyVideoUrl,

    #[error("Table must have at least one header cell")]
    EmptyTableHeader,

    #[error("Block '{0}' may not appear at the document top level")]
    NotTopLevel(&'static str),
}

/// What a block type may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRule {
    /// One or more block children of any top-level-capable type
    Blocks,
    /// Inline content only (text leaves and hard breaks)
    Inline,
    /// Exactly `ListItem` children, at least one
    ListItems,
    /// Exactly `TaskItem` children, at least one
    TaskItems,
    /// Raw text payload (code, math), no children
    RawText,
    /// Inline header cells plus rows of inline cells
    TableGrid,
    /// No content at all
    Atomic,
}

/// Content rule for a block type
pub fn content_rule(kind: &BlockKind) -> ContentRule {
    match kind {
        BlockKind::Paragraph { .. } | BlockKind::Heading { .. } => ContentRule::Inline,
        BlockKind::BulletList { .. } | BlockKind::OrderedList { .. } => ContentRule::ListItems,
        BlockKind::TaskList { .. } => ContentRule::TaskItems,
        BlockKind::ListItem { .. }
        | BlockKind::TaskItem { .. }
        | BlockKind::Blockquote { .. }
        | BlockKind::Callout { .. }
        | BlockKind::Details { .. } => ContentRule::Blocks,
        BlockKind::CodeBlock { .. } | BlockKind::MathBlock { .. } => ContentRule::RawText,
        BlockKind::Table { .. } => ContentRule::TableGrid,
        BlockKind::HorizontalRule
        | BlockKind::Image { .. }
        | BlockKind::ImagePlaceholder
        | BlockKind::VideoEmbed { .. } => ContentRule::Atomic,
    }
}

/// Whether a block type may appear directly in the document block sequence.
/// List items only live inside their list containers.
pub fn is_top_level(kind: &BlockKind) -> bool {
    !matches!(kind, BlockKind::ListItem { .. } | BlockKind::TaskItem { .. })
}

/// Validate a whole document block sequence
pub fn validate_document(blocks: &[Block]) -> Result<(), ModelError> {
    for block in blocks {
        if !is_top_level(&block.kind) {
            return Err(ModelError::NotTopLevel(block.kind.type_name()));
        }
        validate_block(block)?;
    }
    Ok(())
}

/// Validate one block and its subtree against the content-model registry
pub fn validate_block(block: &Block) -> Result<(), ModelError> {
    match &block.kind {
        BlockKind::Heading { level, .. } if !(1..=6).contains(level) => {
            return Err(ModelError::InvalidHeadingLevel(*level));
        }
        BlockKind::Image { attrs } if attrs.src.is_empty() => {
            return Err(ModelError::EmptyImageSource);
        }
        BlockKind::VideoEmbed { url } if url.is_empty() => {
            return Err(ModelError::EmptyVideoUrl);
        }
        BlockKind::Table { header, .. } if header.is_empty() => {
            return Err(ModelError::EmptyTableHeader);
        }
        _ => {}
    }

    let rule = content_rule(&block.kind);
    let parent = block.kind.type_name();
    match rule {
        ContentRule::ListItems => {
            let items = block.kind.child_blocks().expect("list has children");
            if items.is_empty() {
                return Err(ModelError::EmptyContainer { container: parent });
            }
            for item in items {
                if !matches!(item.kind, BlockKind::ListItem { .. }) {
                    return Err(ModelError::InvalidChild {
                        parent,
                        child: item.kind.type_name(),
                    });
                }
                validate_block(item)?;
            }
        }
        ContentRule::TaskItems => {
            let items = block.kind.child_blocks().expect("task list has children");
            if items.is_empty() {
                return Err(ModelError::EmptyContainer { container: parent });
            }
            for item in items {
                if !matches!(item.kind, BlockKind::TaskItem { .. }) {
                    return Err(ModelError::InvalidChild {
                        parent,
                        child: item.kind.type_name(),
                    });
                }
                validate_block(item)?;
            }
        }
        ContentRule::Blocks => {
            let children = block.kind.child_blocks().expect("container has children");
            if children.is_empty() {
                return Err(ModelError::EmptyContainer { container: parent });
            }
            for child in children {
                if !is_top_level(&child.kind) {
                    return Err(ModelError::InvalidChild {
                        parent,
                        child: child.kind.type_name(),
                    });
                }
                validate_block(child)?;
            }
        }
        ContentRule::Inline | ContentRule::RawText | ContentRule::TableGrid | ContentRule::Atomic => {}
    }
    Ok(())
}

/// Coerce an arbitrary block sequence into a valid document fragment.
///
/// Used on the parse degrade path: loose list items are wrapped in a list,
/// empty block containers are dropped, invalid list children become items.
/// Never fails.
pub fn repair_fragment(blocks: Vec<Block>) -> Vec<Block> {
    let mut out = Vec::with_capacity(blocks.len());
    for mut block in blocks {
        repair_block(&mut block);
        match block.kind {
            // A loose item at the top level gets its own single-item list
            BlockKind::ListItem { .. } => {
                out.push(Block::new(BlockKind::BulletList {
                    items: vec![block],
                }));
            }
            BlockKind::TaskItem { .. } => {
                out.push(Block::new(BlockKind::TaskList { items: vec![block] }));
            }
            _ => {
                if !is_droppable(&block) {
                    out.push(block);
                }
            }
        }
    }
    out
}

fn repair_block(block: &mut Block) {
    match &mut block.kind {
        BlockKind::BulletList { items }
        | BlockKind::OrderedList { items, .. } => {
            for item in items.iter_mut() {
                wrap_as_list_item(item, false);
                repair_block(item);
            }
            items.retain(|i| !is_droppable(i));
        }
        BlockKind::TaskList { items } => {
            for item in items.iter_mut() {
                wrap_as_list_item(item, true);
                repair_block(item);
            }
            items.retain(|i| !is_droppable(i));
        }
        BlockKind::ListItem { content }
        | BlockKind::TaskItem { content, .. }
        | BlockKind::Blockquote { content }
        | BlockKind::Callout { content, .. }
        | BlockKind::Details { content, .. } => {
            for child in content.iter_mut() {
                repair_block(child);
            }
            content.retain(|c| !is_droppable(c) && is_top_level(&c.kind));
        }
        _ => {}
    }
}

/// Ensure a list child is the expected item type, wrapping other blocks
fn wrap_as_list_item(block: &mut Block, task: bool) {
    let expected = if task {
        matches!(block.kind, BlockKind::TaskItem { .. })
    } else {
        matches!(block.kind, BlockKind::ListItem { .. })
    };
    if expected {
        return;
    }
    let inner = std::mem::replace(&mut block.kind, BlockKind::HorizontalRule);
    let content = vec![Block::new(inner)];
    block.kind = if task {
        BlockKind::TaskItem {
            checked: false,
            content,
        }
    } else {
        BlockKind::ListItem { content }
    };
}

/// Containers that ended up with nothing inside are dropped rather than
/// serialized as invalid empties
fn is_droppable(block: &Block) -> bool {
    match block.kind.child_blocks() {
        Some(children) => children.is_empty(),
        None => match &block.kind {
            BlockKind::Image { attrs } => attrs.src.is_empty(),
            BlockKind::VideoEmbed { url } => url.is_empty(),
            _ => false,
        },
    }
}
