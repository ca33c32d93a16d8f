//! Block Document Tree
//!
//! This module defines the closed tagged-union node model for Penmark
//! documents: block-level nodes, inline nodes, and the marks that decorate
//! inline text.
//!
//! # Architecture
//!
//! - **Closed variant set**: every node type is a compile-time enum variant,
//!   rendered and serialized through exhaustive matches
//! - **Stable identity**: every block carries a `BlockId` (UUID v4) so async
//!   completions can verify a block still exists before mutating it
//! - **Marks travel with leaves**: a mark has no position of its own; it is
//!   stored on the text leaf it decorates, de-duplicated and canonically
//!   ordered
//!
//! # Examples
//!
//! ```rust
//! use penmark_core::models::{Block, Inline, Mark};
//!
//! let block = Block::paragraph("Hello world");
//! assert_eq!(block.kind.type_name(), "paragraph");
//! assert_eq!(block.plain_text(), "Hello world");
//!
//! let marked = Inline::marked("bold text", vec![Mark::Bold]);
//! assert!(matches!(marked, Inline::Text { .. }));
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity for a block node.
///
/// Identity survives type conversions and attribute edits; it changes only
/// when a block is replaced wholesale (e.g. an upload placeholder resolving
/// into an image). Async completions use it to detect stale targets instead
/// of trusting positions, which shift under concurrent edits elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Uuid);

impl BlockId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Horizontal alignment of an image block.
///
/// Deserialization is lossy on purpose: any value outside the enum coerces
/// to `Center`, the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    /// Parse an alignment string, coercing unknown values to `Center`
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "left" => Alignment::Left,
            "right" => Alignment::Right,
            _ => Alignment::Center,
        }
    }

    /// Whether this is the default (center) alignment
    pub fn is_center(&self) -> bool {
        matches!(self, Alignment::Center)
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

impl<'de> Deserialize<'de> for Alignment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Alignment::from_str_lossy(&s))
    }
}

/// Visual flavor of a callout block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutKind {
    #[default]
    Note,
    Tip,
    Warning,
    Danger,
}

impl CalloutKind {
    /// Parse a callout kind, coercing unknown values to `Note`
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "tip" => CalloutKind::Tip,
            "warning" => CalloutKind::Warning,
            "danger" => CalloutKind::Danger,
            _ => CalloutKind::Note,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            CalloutKind::Note => "note",
            CalloutKind::Tip => "tip",
            CalloutKind::Warning => "warning",
            CalloutKind::Danger => "danger",
        }
    }
}

impl<'de> Deserialize<'de> for CalloutKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(CalloutKind::from_str_lossy(&s))
    }
}

/// Attributes of a resolved image block.
///
/// `src` is required and non-empty; the content-model validator rejects
/// images without a source. A resolved image is created only by replacing
/// an upload placeholder or by Markdown image syntax during parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttrs {
    /// Image source URL (required, non-empty)
    pub src: String,

    /// Alternative text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alt: String,

    /// Optional title (tooltip)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Horizontal alignment, defaults to center
    #[serde(default, skip_serializing_if = "Alignment::is_center")]
    pub align: Alignment,
}

impl ImageAttrs {
    /// Create image attributes with the given source and defaults elsewhere
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: String::new(),
            title: None,
            align: Alignment::Center,
        }
    }

    /// Set the alt text
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the alignment
    pub fn with_align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }
}

/// A non-positional decoration attached to inline text.
///
/// Marks are stored as a set on each text leaf: no duplicate mark types per
/// leaf, canonical ordering so serialization is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Strike,
    Code,
    Link {
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
}

impl Mark {
    /// Canonical nesting rank: lower ranks wrap higher ranks when
    /// serializing (link outermost, inline code innermost).
    pub fn rank(&self) -> u8 {
        match self {
            Mark::Link { .. } => 0,
            Mark::Bold => 1,
            Mark::Italic => 2,
            Mark::Strike => 3,
            Mark::Code => 4,
        }
    }

    /// Whether two marks are the same mark type (ignoring attributes)
    pub fn same_type(&self, other: &Mark) -> bool {
        self.rank() == other.rank()
    }
}

/// Normalize a mark list in place: drop duplicate types (first occurrence
/// wins) and sort into canonical nesting order.
pub fn normalize_marks(marks: &mut Vec<Mark>) {
    let mut seen = [false; 5];
    marks.retain(|m| {
        let r = m.rank() as usize;
        let keep = !seen[r];
        seen[r] = true;
        keep
    });
    marks.sort_by_key(Mark::rank);
}

/// Inline content: text leaves with marks, and hard line breaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
    HardBreak,
}

impl Inline {
    /// Plain text leaf with no marks
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// Text leaf with the given marks (normalized)
    pub fn marked(text: impl Into<String>, mut marks: Vec<Mark>) -> Self {
        normalize_marks(&mut marks);
        Inline::Text {
            text: text.into(),
            marks,
        }
    }

    /// Visible text of this inline node
    pub fn plain_text(&self) -> &str {
        match self {
            Inline::Text { text, .. } => text,
            Inline::HardBreak => "\n",
        }
    }
}

/// A block-level node of the document tree.
///
/// The `id` is editing-session identity, not content: two blocks with
/// different ids may carry identical content (see [`Block::content_eq`]).
/// Parsed documents receive fresh ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identity for async-safety checks
    #[serde(default)]
    pub id: BlockId,

    /// The typed payload
    #[serde(flatten)]
    pub kind: BlockKind,
}

/// The closed set of block node types.
///
/// Container variants own their children directly; `Details` encodes its
/// "exactly one summary then one content" constraint structurally instead
/// of through runtime schema checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockKind {
    Paragraph {
        content: Vec<Inline>,
    },
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    BulletList {
        items: Vec<Block>,
    },
    OrderedList {
        start: u64,
        items: Vec<Block>,
    },
    ListItem {
        content: Vec<Block>,
    },
    TaskList {
        items: Vec<Block>,
    },
    TaskItem {
        checked: bool,
        content: Vec<Block>,
    },
    Blockquote {
        content: Vec<Block>,
    },
    CodeBlock {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        language: String,
        code: String,
    },
    MathBlock {
        expr: String,
    },
    Callout {
        #[serde(default)]
        kind: CalloutKind,
        content: Vec<Block>,
    },
    Details {
        summary: Vec<Inline>,
        content: Vec<Block>,
    },
    Table {
        header: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    HorizontalRule,
    Image {
        #[serde(flatten)]
        attrs: ImageAttrs,
    },
    /// Transient editing artifact for an in-progress image upload.
    /// Never serialized to Markdown; stripped at save time.
    ImagePlaceholder,
    VideoEmbed {
        url: String,
    },
}

impl BlockKind {
    /// Serialized type tag of this variant
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Heading { .. } => "heading",
            BlockKind::BulletList { .. } => "bulletList",
            BlockKind::OrderedList { .. } => "orderedList",
            BlockKind::ListItem { .. } => "listItem",
            BlockKind::TaskList { .. } => "taskList",
            BlockKind::TaskItem { .. } => "taskItem",
            BlockKind::Blockquote { .. } => "blockquote",
            BlockKind::CodeBlock { .. } => "codeBlock",
            BlockKind::MathBlock { .. } => "mathBlock",
            BlockKind::Callout { .. } => "callout",
            BlockKind::Details { .. } => "details",
            BlockKind::Table { .. } => "table",
            BlockKind::HorizontalRule => "horizontalRule",
            BlockKind::Image { .. } => "image",
            BlockKind::ImagePlaceholder => "imagePlaceholder",
            BlockKind::VideoEmbed { .. } => "videoEmbed",
        }
    }

    /// Child blocks of a container variant, if any
    pub fn child_blocks(&self) -> Option<&Vec<Block>> {
        match self {
            BlockKind::BulletList { items }
            | BlockKind::OrderedList { items, .. }
            | BlockKind::TaskList { items } => Some(items),
            BlockKind::ListItem { content }
            | BlockKind::TaskItem { content, .. }
            | BlockKind::Blockquote { content }
            | BlockKind::Callout { content, .. }
            | BlockKind::Details { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Mutable child blocks of a container variant, if any
    pub fn child_blocks_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            BlockKind::BulletList { items }
            | BlockKind::OrderedList { items, .. }
            | BlockKind::TaskList { items } => Some(items),
            BlockKind::ListItem { content }
            | BlockKind::TaskItem { content, .. }
            | BlockKind::Blockquote { content }
            | BlockKind::Callout { content, .. }
            | BlockKind::Details { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Inline content of a textblock variant, if any
    pub fn inline_content(&self) -> Option<&Vec<Inline>> {
        match self {
            BlockKind::Paragraph { content } | BlockKind::Heading { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Mutable inline content of a textblock variant, if any
    pub fn inline_content_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            BlockKind::Paragraph { content } | BlockKind::Heading { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Whether this variant is atomic: no child blocks and no editable
    /// inline content (horizontal rule, image, placeholder, video embed)
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            BlockKind::HorizontalRule
                | BlockKind::Image { .. }
                | BlockKind::ImagePlaceholder
                | BlockKind::VideoEmbed { .. }
        )
    }
}

impl Block {
    /// Create a block with a fresh id
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: BlockId::new(),
            kind,
        }
    }

    /// Paragraph with a single unmarked text leaf
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph {
            content: vec![Inline::text(text)],
        })
    }

    /// Paragraph with explicit inline content
    pub fn paragraph_of(content: Vec<Inline>) -> Self {
        Self::new(BlockKind::Paragraph { content })
    }

    /// Heading with a single unmarked text leaf; level is clamped to 1..=6
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(BlockKind::Heading {
            level: level.clamp(1, 6),
            content: vec![Inline::text(text)],
        })
    }

    /// Resolved image block
    pub fn image(attrs: ImageAttrs) -> Self {
        Self::new(BlockKind::Image { attrs })
    }

    /// Upload placeholder block
    pub fn image_placeholder() -> Self {
        Self::new(BlockKind::ImagePlaceholder)
    }

    /// Visible text of this block and all descendants
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            BlockKind::Paragraph { content } | BlockKind::Heading { content, .. } => {
                for inline in content {
                    out.push_str(inline.plain_text());
                }
            }
            BlockKind::CodeBlock { code, .. } => out.push_str(code),
            BlockKind::MathBlock { expr } => out.push_str(expr),
            BlockKind::Details { summary, content } => {
                for inline in summary {
                    out.push_str(inline.plain_text());
                }
                for child in content {
                    out.push('\n');
                    child.collect_text(out);
                }
            }
            BlockKind::Table { header, rows } => {
                for cell in header {
                    for inline in cell {
                        out.push_str(inline.plain_text());
                    }
                    out.push(' ');
                }
                for row in rows {
                    out.push('\n');
                    for cell in row {
                        for inline in cell {
                            out.push_str(inline.plain_text());
                        }
                        out.push(' ');
                    }
                }
            }
            BlockKind::Image { attrs } => out.push_str(&attrs.alt),
            BlockKind::HorizontalRule
            | BlockKind::ImagePlaceholder
            | BlockKind::VideoEmbed { .. } => {}
            _ => {
                if let Some(children) = self.kind.child_blocks() {
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            out.push('\n');
                        }
                        child.collect_text(out);
                    }
                }
            }
        }
    }

    /// Structural equality ignoring block ids
    pub fn content_eq(&self, other: &Block) -> bool {
        match (self.kind.child_blocks(), other.kind.child_blocks()) {
            (Some(a), Some(b)) => {
                kinds_shallow_eq(&self.kind, &other.kind)
                    && a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.content_eq(y))
            }
            (None, None) => self.kind == other.kind,
            _ => false,
        }
    }

    /// Find a descendant block (or self) by id
    pub fn find(&self, id: BlockId) -> Option<&Block> {
        if self.id == id {
            return Some(self);
        }
        self.kind
            .child_blocks()
            .and_then(|children| children.iter().find_map(|c| c.find(id)))
    }

    /// Whether this block or any descendant has the given id
    pub fn contains(&self, id: BlockId) -> bool {
        self.find(id).is_some()
    }
}

/// Compare two container kinds ignoring their child blocks
fn kinds_shallow_eq(a: &BlockKind, b: &BlockKind) -> bool {
    match (a, b) {
        (BlockKind::OrderedList { start: s1, .. }, BlockKind::OrderedList { start: s2, .. }) => {
            s1 == s2
        }
        (BlockKind::TaskItem { checked: c1, .. }, BlockKind::TaskItem { checked: c2, .. }) => {
            c1 == c2
        }
        (BlockKind::Callout { kind: k1, .. }, BlockKind::Callout { kind: k2, .. }) => k1 == k2,
        (BlockKind::Details { summary: s1, .. }, BlockKind::Details { summary: s2, .. }) => {
            s1 == s2
        }
        _ => a.type_name() == b.type_name(),
    }
}

/// Visible text of a block fragment, blocks separated by newlines
pub fn fragment_plain_text(blocks: &[Block]) -> String {
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&block.plain_text());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_ids_are_unique() {
        let a = Block::paragraph("one");
        let b = Block::paragraph("one");
        assert_ne!(a.id, b.id);
        assert!(a.content_eq(&b));
    }

    #[test]
    fn test_alignment_coerces_unknown_values() {
        assert_eq!(Alignment::from_str_lossy("left"), Alignment::Left);
        assert_eq!(Alignment::from_str_lossy("RIGHT"), Alignment::Right);
        assert_eq!(Alignment::from_str_lossy("justify"), Alignment::Center);
        assert_eq!(Alignment::from_str_lossy(""), Alignment::Center);

        let attrs: ImageAttrs =
            serde_json::from_str(r#"{"src":"a.png","align":"diagonal"}"#).unwrap();
        assert_eq!(attrs.align, Alignment::Center);
    }

    #[test]
    fn test_marks_normalize_to_canonical_order() {
        let mut marks = vec![
            Mark::Code,
            Mark::Bold,
            Mark::Bold,
            Mark::Link {
                href: "https://example.com".into(),
                title: None,
            },
        ];
        normalize_marks(&mut marks);
        assert_eq!(marks.len(), 3);
        assert!(matches!(marks[0], Mark::Link { .. }));
        assert!(matches!(marks[1], Mark::Bold));
        assert!(matches!(marks[2], Mark::Code));
    }

    #[test]
    fn test_block_serialization_tags() {
        let block = Block::heading(2, "Title");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["level"], 2);

        let rule = Block::new(BlockKind::HorizontalRule);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "horizontalRule");
    }

    #[test]
    fn test_block_deserialization_without_id() {
        let block: Block =
            serde_json::from_str(r#"{"type":"paragraph","content":[{"type":"text","text":"hi"}]}"#)
                .unwrap();
        assert_eq!(block.plain_text(), "hi");
    }

    #[test]
    fn test_find_descendant_by_id() {
        let inner = Block::paragraph("inner");
        let inner_id = inner.id;
        let quote = Block::new(BlockKind::Blockquote {
            content: vec![inner],
        });
        assert!(quote.contains(inner_id));
        assert_eq!(quote.find(inner_id).unwrap().plain_text(), "inner");
        assert!(!quote.contains(BlockId::new()));
    }

    #[test]
    fn test_plain_text_recurses_containers() {
        let list = Block::new(BlockKind::BulletList {
            items: vec![
                Block::new(BlockKind::ListItem {
                    content: vec![Block::paragraph("first")],
                }),
                Block::new(BlockKind::ListItem {
                    content: vec![Block::paragraph("second")],
                }),
            ],
        });
        assert_eq!(list.plain_text(), "first\nsecond");
    }
}
