//! Editor Error Types
//!
//! High-level error types for document mutations and the upload lifecycle,
//! with detailed context and proper error chaining. Every mutation that
//! fails leaves the document tree unmodified.

use crate::editor::upload::UploadError;
use crate::models::{BlockId, ModelError};
use thiserror::Error;

/// Editing operation errors
#[derive(Error, Debug)]
pub enum EditorError {
    /// No block with the given id exists in the document
    #[error("Block not found: {id}")]
    BlockNotFound { id: BlockId },

    /// The mutation would violate a content-model constraint
    #[error("Content model violation: {0}")]
    ModelViolation(#[from] ModelError),

    /// Text operation against a block without inline content
    #[error("Block '{block_type}' has no inline content")]
    NoInlineContent { block_type: &'static str },

    /// Character range outside the block's inline text
    #[error("Invalid text range {start}..{end} (content length {len})")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    /// Block type conversion with no defined content mapping
    #[error("Block '{from}' cannot be converted to '{to}'")]
    NotConvertible {
        from: &'static str,
        to: &'static str,
    },

    /// Upload lifecycle violation (wrong state for the event)
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Upload event against a block that is not a placeholder
    #[error("Block {id} is not an upload placeholder")]
    NotAPlaceholder { id: BlockId },

    /// Action against a block of the wrong kind (e.g. image toolbar on a
    /// paragraph)
    #[error("Block {id} is not a '{expected}' block")]
    WrongBlockKind {
        id: BlockId,
        expected: &'static str,
    },
}

impl EditorError {
    /// Create a block not found error
    pub fn block_not_found(id: BlockId) -> Self {
        Self::BlockNotFound { id }
    }

    /// Create an invalid range error
    pub fn invalid_range(start: usize, end: usize, len: usize) -> Self {
        Self::InvalidRange { start, end, len }
    }

    /// Create a not-convertible error
    pub fn not_convertible(from: &'static str, to: &'static str) -> Self {
        Self::NotConvertible { from, to }
    }
}
