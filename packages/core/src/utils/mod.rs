//! Utility functions

pub mod markdown;

pub use markdown::{derive_title, strip_markdown};
