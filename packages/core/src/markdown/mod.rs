//! Markdown Bridge
//!
//! The document tree is the source of truth; Markdown is the persistence
//! and interchange format. `parse` is total (malformed input degrades to
//! paragraphs rather than failing) and `serialize ∘ parse` is idempotent:
//! one round trip normalizes a document, and further round trips are
//! byte-identical.

mod parse;
mod serialize;

pub use parse::{parse, parse_fragment};
pub use serialize::{render_inlines, serialize, serialize_blocks};

#[cfg(test)]
#[path = "parse_test.rs"]
mod parse_test;

#[cfg(test)]
#[path = "roundtrip_test.rs"]
mod roundtrip_test;
