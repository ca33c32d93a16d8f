//! Editing Layer
//!
//! Everything that mutates or observes a document during an editing
//! session: id-addressed tree mutations, the slash-command palette, the
//! image upload placeholder lifecycle, and per-block view state. All
//! mutations validate against the content model and leave the tree
//! unmodified on failure.

pub mod commands;
pub mod document;
pub mod error;
pub mod session;
pub mod upload;
pub mod views;

pub use commands::{
    execute, match_commands, CommandItem, CommandOutcome, CommandSpec, CursorContext,
    COMMAND_CATALOG,
};
pub use document::{BlockType, Cursor, Document, TextRange};
pub use error::EditorError;
pub use session::EditorSession;
pub use upload::{
    transition, validate_absolute_url, validate_file, FileUpload, ImageStore, PlaceholderState,
    UploadEffect, UploadError, UploadEvent, UploadState, UploadedImage, MAX_UPLOAD_BYTES,
};
pub use views::{delete_image, set_image_align, DetailsView, ImageView};



#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;
