//! Image Upload Placeholder Lifecycle
//!
//! A placeholder block represents a picture before it has a source. Its
//! behavior is a pure state machine: `transition` maps a state and an event
//! to the next state plus a list of effect descriptions, with no I/O and no
//! framework coupling. The editing session interprets the effects (start
//! the network upload, replace the block, remove the block); any UI layer
//! can bind to the same machine.
//!
//! ```text
//! Idle ──DragEnter──▶ Dragging ──DragLeave──▶ Idle
//!  │                      │
//!  └──Drop/PickFile───────┴──▶ Uploading ──Succeeded──▶ (replaced)
//!                                   │
//!                                   └──Failed──▶ Idle { error }
//! ```
//!
//! `url_entry_open` is orthogonal to the main machine: submitting a valid
//! absolute URL replaces the block immediately with no network call, while
//! an invalid URL shows an inline error and keeps the entry open.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Upload size ceiling: 5 MiB, checked before any I/O
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Absolute http(s) URL with a non-empty host
static ABSOLUTE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

/// Pre-upload validation and collaborator failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("'{media_type}' is not an image type")]
    NotAnImage { media_type: String },

    #[error("File is {size} bytes, larger than the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("'{input}' is not a valid absolute URL")]
    InvalidUrl { input: String },

    #[error("Upload rejected: {0}")]
    StoreRejected(String),
}

/// A file handed to the placeholder by drag-drop or the file picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// Result of a successful store upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
}

/// External collaborator that stores image files.
///
/// The caller pre-validates type and size, but the store may impose its own
/// limits and reject anyway.
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, file: &FileUpload) -> Result<UploadedImage, UploadError>;
}

/// Main lifecycle state of one placeholder block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    /// Empty drop zone; carries the message of the last failed attempt
    Idle { error: Option<String> },
    /// Pointer with a payload is over the zone
    Dragging,
    /// Exactly one attempt in flight
    Uploading,
}

impl UploadState {
    pub fn idle() -> Self {
        UploadState::Idle { error: None }
    }
}

/// Full view state of a placeholder: the lifecycle machine plus the
/// orthogonal URL-entry flag and its inline validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderState {
    pub state: UploadState,
    pub url_entry_open: bool,
    pub url_error: Option<String>,
}

impl Default for PlaceholderState {
    fn default() -> Self {
        Self {
            state: UploadState::idle(),
            url_entry_open: false,
            url_error: None,
        }
    }
}

impl PlaceholderState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// User and collaborator events driving the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    DragEnter,
    DragLeave,
    Drop(FileUpload),
    PickFile(FileUpload),
    UploadSucceeded { url: String },
    UploadFailed { message: String },
    ToggleUrlEntry,
    SubmitUrl(String),
    Delete,
}

/// Effect descriptions for the session to interpret.
///
/// `StartUpload` is the only asynchronous one; `ReplaceWithImage` and
/// `RemoveBlock` are synchronous tree mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEffect {
    StartUpload(FileUpload),
    ReplaceWithImage { src: String },
    RemoveBlock,
}

/// Advance the placeholder machine by one event.
///
/// Pure function: same state and event always produce the same successor
/// and effects. A second drop or file-pick while `Uploading` is ignored so
/// at most one attempt is in flight per placeholder.
pub fn transition(
    current: PlaceholderState,
    event: UploadEvent,
) -> (PlaceholderState, Vec<UploadEffect>) {
    let mut next = current;
    let mut effects = Vec::new();

    match event {
        UploadEvent::DragEnter => {
            if !matches!(next.state, UploadState::Uploading) {
                next.state = UploadState::Dragging;
            }
        }
        UploadEvent::DragLeave => {
            if matches!(next.state, UploadState::Dragging) {
                next.state = UploadState::idle();
            }
        }
        UploadEvent::Drop(file) | UploadEvent::PickFile(file) => {
            if matches!(next.state, UploadState::Uploading) {
                // one attempt in flight; ignore
            } else {
                match validate_file(&file) {
                    Ok(()) => {
                        next.state = UploadState::Uploading;
                        effects.push(UploadEffect::StartUpload(file));
                    }
                    Err(e) => {
                        next.state = UploadState::Idle {
                            error: Some(e.to_string()),
                        };
                    }
                }
            }
        }
        UploadEvent::UploadSucceeded { url } => {
            if matches!(next.state, UploadState::Uploading) {
                next.state = UploadState::idle();
                effects.push(UploadEffect::ReplaceWithImage { src: url });
            }
        }
        UploadEvent::UploadFailed { message } => {
            if matches!(next.state, UploadState::Uploading) {
                next.state = UploadState::Idle {
                    error: Some(message),
                };
            }
        }
        UploadEvent::ToggleUrlEntry => {
            next.url_entry_open = !next.url_entry_open;
            if !next.url_entry_open {
                next.url_error = None;
            }
        }
        UploadEvent::SubmitUrl(input) => {
            if !matches!(next.state, UploadState::Uploading) {
                match validate_absolute_url(&input) {
                    Ok(()) => {
                        next.url_error = None;
                        effects.push(UploadEffect::ReplaceWithImage { src: input });
                    }
                    Err(e) => {
                        next.url_entry_open = true;
                        next.url_error = Some(e.to_string());
                    }
                }
            }
        }
        UploadEvent::Delete => {
            effects.push(UploadEffect::RemoveBlock);
        }
    }

    (next, effects)
}

/// Synchronous pre-upload checks: image media type, 5 MiB ceiling
pub fn validate_file(file: &FileUpload) -> Result<(), UploadError> {
    if !file.media_type.starts_with("image/") {
        return Err(UploadError::NotAnImage {
            media_type: file.media_type.clone(),
        });
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size: file.bytes.len(),
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Validate a user-entered URL: absolute http(s) with a host. Shared by
/// the URL-entry flow and the prompt-flavored palette commands.
pub fn validate_absolute_url(input: &str) -> Result<(), UploadError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !ABSOLUTE_URL_RE.is_match(trimmed) {
        return Err(UploadError::InvalidUrl {
            input: input.to_string(),
        });
    }
    Ok(())
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;
