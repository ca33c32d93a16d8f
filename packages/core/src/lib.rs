//! Penmark Core Editing Layer
//!
//! This crate provides the document model, editing operations, and
//! Markdown persistence for the Penmark blogging platform's block editor.
//!
//! # Architecture
//!
//! - **Tree of typed blocks**: A closed set of block node types owning
//!   their children directly; the tree is the source of truth
//! - **Markdown as storage**: The document serializes to CommonMark plus
//!   extensions, and parsing is total (malformed input degrades to text)
//! - **Pure state machines**: Upload and view lifecycles are functions
//!   from state and event to state and effects, with no I/O inside
//! - **Async behind traits**: Image stores, publishers, and memo sources
//!   are trait objects the session awaits
//!
//! # Modules
//!
//! - [`models`] - Block tree data structures and the content-model rules
//! - [`editor`] - Session, mutations, slash commands, upload lifecycle
//! - [`markdown`] - Tree ⇄ Markdown bridge
//! - [`classify`] - Keyword-scoring category suggestion
//! - [`draft`] - Post drafts and persistence collaborator traits
//! - [`utils`] - Markdown stripping and title derivation

pub mod models;
pub mod editor;
pub mod markdown;
pub mod classify;
pub mod draft;
pub mod utils;

// Re-export commonly used types
pub use models::*;
pub use editor::*;
pub use classify::{
    suggest_category, suggest_for, Category, SuggestedCategory, SuggestionTracker,
};
pub use draft::{DraftStatus, Memo, MemoSource, PostDraft, Publisher};
