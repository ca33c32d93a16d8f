//! Interactive Node View State
//!
//! View-local state for the two stateful block renderings, kept as pure
//! machines so any UI layer can bind them. Nothing here is ever serialized:
//! hover and expand/collapse are presentation concerns, not document
//! content.

use crate::editor::document::Document;
use crate::editor::error::EditorError;
use crate::models::{Alignment, BlockId, BlockKind};

/// Hover state of a resolved image block (toolbar visibility)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageView {
    #[default]
    Idle,
    Hovered,
}

impl ImageView {
    pub fn on_hover_enter(self) -> Self {
        ImageView::Hovered
    }

    pub fn on_hover_leave(self) -> Self {
        ImageView::Idle
    }

    /// Whether the alignment/delete toolbar is visible
    pub fn toolbar_visible(&self) -> bool {
        matches!(self, ImageView::Hovered)
    }
}

/// Toolbar action: set an image's alignment. Synchronous, no async step.
pub fn set_image_align(
    doc: &mut Document,
    id: BlockId,
    align: Alignment,
) -> Result<(), EditorError> {
    let block = doc.find(id).ok_or(EditorError::BlockNotFound { id })?;
    let attrs = match &block.kind {
        BlockKind::Image { attrs } => attrs.clone().with_align(align),
        _ => {
            return Err(EditorError::WrongBlockKind {
                id,
                expected: "image",
            })
        }
    };
    let mut replacement = block.clone();
    replacement.kind = BlockKind::Image { attrs };
    // same id: identity survives an attribute edit
    doc.replace_block(id, replacement)?;
    Ok(())
}

/// Toolbar action: delete an image block. Synchronous, no async step.
pub fn delete_image(doc: &mut Document, id: BlockId) -> Result<(), EditorError> {
    match doc.find(id).map(|b| &b.kind) {
        Some(BlockKind::Image { .. }) => {
            doc.remove_block(id)?;
            Ok(())
        }
        Some(_) => Err(EditorError::WrongBlockKind {
            id,
            expected: "image",
        }),
        None => Err(EditorError::BlockNotFound { id }),
    }
}

/// Expand/collapse state of a details (toggle) block.
///
/// Initial state is collapsed; there is no terminal state. The persisted
/// form always carries both summary and content regardless of this state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailsView {
    #[default]
    Collapsed,
    Expanded,
}

impl DetailsView {
    pub fn toggle(self) -> Self {
        match self {
            DetailsView::Collapsed => DetailsView::Expanded,
            DetailsView::Expanded => DetailsView::Collapsed,
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self, DetailsView::Expanded)
    }
}
