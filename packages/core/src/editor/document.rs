//! Document Controller
//!
//! The `Document` owns the block tree for one editing session. Surrounding
//! code submits mutations through this API and reads snapshots back; nothing
//! outside the session ever holds a live handle into the tree.
//!
//! Every mutation validates against the content-model registry before
//! touching the tree: a rejected mutation returns an error and leaves the
//! document exactly as it was.
//!
//! Addressing is id-based. Character offsets inside a block's inline content
//! are only ever used synchronously; across await points callers must
//! re-check block identity (see `EditorSession::complete_upload`).

use crate::editor::error::EditorError;
use crate::models::{
    is_top_level, normalize_marks, validate_block, validate_document, Block, BlockId, BlockKind,
    Inline, Mark,
};

/// A caret position inside one block's inline content (character offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub block: BlockId,
    pub offset: usize,
}

/// A character range inside one block's inline content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub block: BlockId,
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(block: BlockId, start: usize, end: usize) -> Self {
        Self { block, start, end }
    }
}

/// Target of a block type conversion.
///
/// Conversions are defined between the text-bearing types; containers and
/// atomic blocks do not convert.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockType {
    Paragraph,
    Heading(u8),
    CodeBlock { language: String },
    MathBlock,
}

impl BlockType {
    fn type_name(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading(_) => "heading",
            BlockType::CodeBlock { .. } => "codeBlock",
            BlockType::MathBlock => "mathBlock",
        }
    }
}

/// The document tree owned by an editing session
#[derive(Debug, Clone, Default)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Empty document: a single blank paragraph
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::paragraph_of(Vec::new())],
        }
    }

    /// Build a document from blocks, validating the whole tree
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, EditorError> {
        validate_document(&blocks)?;
        Ok(Self { blocks })
    }

    /// Build a document without validation. Only for input that has already
    /// been through `repair_fragment` (the Markdown parse path).
    pub(crate) fn from_repaired(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Read-only view of the top-level block sequence
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of top-level blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the document has no blocks at all
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether a block with this id exists anywhere in the tree
    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.iter().any(|b| b.contains(id))
    }

    /// Find a block anywhere in the tree
    pub fn find(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find_map(|b| b.find(id))
    }

    fn find_mut_in(blocks: &mut [Block], id: BlockId) -> Option<&mut Block> {
        for block in blocks {
            if block.id == id {
                return Some(block);
            }
            if let Some(children) = block.kind.child_blocks_mut() {
                if let Some(found) = Self::find_mut_in(children, id) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn find_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        Self::find_mut_in(&mut self.blocks, id)
    }

    /// Index of the top-level block that is (or contains) `id`
    pub fn top_level_index(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.contains(id))
    }

    // ------------------------------------------------------------------
    // Block-level mutations
    // ------------------------------------------------------------------

    /// Insert a fragment at a top-level index. The fragment is validated
    /// first; on error nothing is inserted.
    pub fn insert_content_at(
        &mut self,
        index: usize,
        fragment: Vec<Block>,
    ) -> Result<(), EditorError> {
        validate_document(&fragment)?;
        let index = index.min(self.blocks.len());
        tracing::debug!(index, count = fragment.len(), "inserting fragment");
        self.blocks.splice(index..index, fragment);
        Ok(())
    }

    /// Insert one block after the top-level block containing `id`
    pub fn insert_after(&mut self, id: BlockId, block: Block) -> Result<BlockId, EditorError> {
        let new_id = block.id;
        let index = self
            .top_level_index(id)
            .ok_or(EditorError::BlockNotFound { id })?;
        self.insert_content_at(index + 1, vec![block])?;
        Ok(new_id)
    }

    /// Remove a block anywhere in the tree, pruning containers that become
    /// empty as a result. Returns the removed block.
    pub fn remove_block(&mut self, id: BlockId) -> Result<Block, EditorError> {
        let removed = Self::remove_in(&mut self.blocks, id)
            .ok_or(EditorError::BlockNotFound { id })?;
        Self::prune_empty(&mut self.blocks);
        tracing::debug!(%id, kind = removed.kind.type_name(), "removed block");
        Ok(removed)
    }

    fn remove_in(blocks: &mut Vec<Block>, id: BlockId) -> Option<Block> {
        if let Some(pos) = blocks.iter().position(|b| b.id == id) {
            return Some(blocks.remove(pos));
        }
        for block in blocks {
            if let Some(children) = block.kind.child_blocks_mut() {
                if let Some(removed) = Self::remove_in(children, id) {
                    return Some(removed);
                }
            }
        }
        None
    }

    fn prune_empty(blocks: &mut Vec<Block>) {
        for block in blocks.iter_mut() {
            if let Some(children) = block.kind.child_blocks_mut() {
                Self::prune_empty(children);
            }
        }
        blocks.retain(|b| match b.kind.child_blocks() {
            Some(children) => !children.is_empty(),
            None => true,
        });
    }

    /// Atomically replace a block in place: delete + insert at the same
    /// tree position, siblings untouched. This is the placeholder → image
    /// resolution path.
    pub fn replace_block(&mut self, id: BlockId, mut new: Block) -> Result<BlockId, EditorError> {
        validate_block(&new)?;
        let slot = Self::find_mut_in(&mut self.blocks, id)
            .ok_or(EditorError::BlockNotFound { id })?;
        if !is_top_level(&new.kind) {
            // item-type replacements only make sense where an item already sits
            if is_top_level(&slot.kind) {
                return Err(EditorError::not_convertible(
                    slot.kind.type_name(),
                    new.kind.type_name(),
                ));
            }
        }
        let new_id = new.id;
        std::mem::swap(slot, &mut new);
        tracing::debug!(old = %id, new = %new_id, "replaced block");
        Ok(new_id)
    }

    /// Convert a text-bearing block to another text-bearing type,
    /// preserving content. Identity (`id`) is preserved.
    pub fn set_block_type(&mut self, id: BlockId, target: BlockType) -> Result<(), EditorError> {
        let block = self
            .find_mut(id)
            .ok_or(EditorError::BlockNotFound { id })?;

        let from = block.kind.type_name();
        let kind = std::mem::replace(&mut block.kind, BlockKind::HorizontalRule);
        let converted = convert_kind(kind, &target);
        match converted {
            Ok(new_kind) => {
                block.kind = new_kind;
                tracing::debug!(%id, from, to = target.type_name(), "converted block type");
                Ok(())
            }
            Err(original) => {
                block.kind = original;
                Err(EditorError::not_convertible(from, target.type_name()))
            }
        }
    }

    /// Toggle a blockquote wrapper around the top-level block containing
    /// `id`: wrap it, or unwrap it if it already is a blockquote.
    pub fn toggle_wrapper(&mut self, id: BlockId) -> Result<(), EditorError> {
        let index = self
            .top_level_index(id)
            .ok_or(EditorError::BlockNotFound { id })?;
        let is_quote = matches!(self.blocks[index].kind, BlockKind::Blockquote { .. });
        if is_quote {
            let quote = self.blocks.remove(index);
            if let BlockKind::Blockquote { content } = quote.kind {
                self.blocks.splice(index..index, content);
            }
        } else {
            let inner = self.blocks.remove(index);
            self.blocks.insert(
                index,
                Block::new(BlockKind::Blockquote {
                    content: vec![inner],
                }),
            );
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inline text mutations
    // ------------------------------------------------------------------

    /// Delete a character range from a block's inline content
    pub fn delete_range(&mut self, range: &TextRange) -> Result<(), EditorError> {
        let block = self
            .find_mut(range.block)
            .ok_or(EditorError::BlockNotFound { id: range.block })?;
        let type_name = block.kind.type_name();
        let content = block
            .kind
            .inline_content_mut()
            .ok_or(EditorError::NoInlineContent {
                block_type: type_name,
            })?;
        let len = inline_len(content);
        if range.start > range.end || range.end > len {
            return Err(EditorError::invalid_range(range.start, range.end, len));
        }
        delete_span(content, range.start, range.end);
        Ok(())
    }

    /// Insert plain text at a cursor, inheriting the marks of the leaf the
    /// cursor sits in
    pub fn insert_text(&mut self, cursor: &Cursor, text: &str) -> Result<(), EditorError> {
        let block = self
            .find_mut(cursor.block)
            .ok_or(EditorError::BlockNotFound { id: cursor.block })?;
        let type_name = block.kind.type_name();
        let content = block
            .kind
            .inline_content_mut()
            .ok_or(EditorError::NoInlineContent {
                block_type: type_name,
            })?;
        let len = inline_len(content);
        if cursor.offset > len {
            return Err(EditorError::invalid_range(cursor.offset, cursor.offset, len));
        }
        insert_text_at(content, cursor.offset, text);
        Ok(())
    }

    /// Splice an externally-parsed fragment at a cursor position,
    /// re-validating the insertion point's content model.
    ///
    /// - a lone paragraph merges into a paragraph cursor at the offset
    /// - a block fragment aimed at an inline-only context (a heading)
    ///   degrades to inserting the fragment's plain text at the cursor
    /// - anything else is inserted as blocks after the cursor's top-level
    ///   block
    pub fn splice_fragment(
        &mut self,
        cursor: &Cursor,
        mut fragment: Vec<Block>,
    ) -> Result<(), EditorError> {
        if fragment.is_empty() {
            return Ok(());
        }
        let target = self
            .find(cursor.block)
            .ok_or(EditorError::BlockNotFound { id: cursor.block })?;

        let single_paragraph = fragment.len() == 1
            && matches!(fragment[0].kind, BlockKind::Paragraph { .. });
        match &target.kind {
            BlockKind::Paragraph { .. } if single_paragraph => {
                let inlines = match fragment.remove(0).kind {
                    BlockKind::Paragraph { content } => content,
                    _ => unreachable!(),
                };
                let text_len: usize = inline_len(&inlines);
                tracing::debug!(block = %cursor.block, chars = text_len, "merging memo inline");
                let block = self.find_mut(cursor.block).expect("checked above");
                let content = block.kind.inline_content_mut().expect("paragraph");
                let mut pos_content = std::mem::take(content);
                splice_inlines(&mut pos_content, cursor.offset, inlines);
                *content = pos_content;
                Ok(())
            }
            BlockKind::Heading { .. } => {
                // inline-only context; degrade to plain text
                let text = crate::models::fragment_plain_text(&fragment).replace('\n', " ");
                self.insert_text(cursor, &text)
            }
            _ => {
                let index = self
                    .top_level_index(cursor.block)
                    .ok_or(EditorError::BlockNotFound { id: cursor.block })?;
                self.insert_content_at(index + 1, fragment)
            }
        }
    }

    /// Toggle a mark over a character range: if every text leaf in the
    /// range already carries the mark type it is removed, otherwise it is
    /// applied (replacing any same-type mark, so re-linking updates the
    /// href).
    pub fn toggle_mark(&mut self, range: &TextRange, mark: Mark) -> Result<(), EditorError> {
        let block = self
            .find_mut(range.block)
            .ok_or(EditorError::BlockNotFound { id: range.block })?;
        let type_name = block.kind.type_name();
        let content = block
            .kind
            .inline_content_mut()
            .ok_or(EditorError::NoInlineContent {
                block_type: type_name,
            })?;
        let len = inline_len(content);
        if range.start > range.end || range.end > len {
            return Err(EditorError::invalid_range(range.start, range.end, len));
        }
        toggle_mark_span(content, range.start, range.end, &mark);
        Ok(())
    }
}

/// Character length of an inline sequence (hard breaks count as one)
pub fn inline_len(content: &[Inline]) -> usize {
    content
        .iter()
        .map(|inline| match inline {
            Inline::Text { text, .. } => text.chars().count(),
            Inline::HardBreak => 1,
        })
        .sum()
}

fn char_slice(text: &str, from: usize, to: usize) -> String {
    text.chars().skip(from).take(to.saturating_sub(from)).collect()
}

fn delete_span(content: &mut Vec<Inline>, start: usize, end: usize) {
    let mut out = Vec::with_capacity(content.len());
    let mut pos = 0usize;
    for inline in content.drain(..) {
        match inline {
            Inline::HardBreak => {
                if !(pos >= start && pos < end) {
                    out.push(Inline::HardBreak);
                }
                pos += 1;
            }
            Inline::Text { text, marks } => {
                let len = text.chars().count();
                let leaf_start = pos;
                let leaf_end = pos + len;
                if leaf_end <= start || leaf_start >= end {
                    out.push(Inline::Text { text, marks });
                } else {
                    let cut_from = start.saturating_sub(leaf_start);
                    let cut_to = (end - leaf_start).min(len);
                    let head = char_slice(&text, 0, cut_from);
                    let tail = char_slice(&text, cut_to, len);
                    if !head.is_empty() {
                        out.push(Inline::Text {
                            text: head,
                            marks: marks.clone(),
                        });
                    }
                    if !tail.is_empty() {
                        out.push(Inline::Text { text: tail, marks });
                    }
                }
                pos = leaf_end;
            }
        }
    }
    *content = out;
    merge_adjacent(content);
}

fn insert_text_at(content: &mut Vec<Inline>, offset: usize, insert: &str) {
    if content.is_empty() {
        content.push(Inline::text(insert));
        return;
    }
    let mut pos = 0usize;
    for inline in content.iter_mut() {
        match inline {
            Inline::HardBreak => {
                pos += 1;
            }
            Inline::Text { text, .. } => {
                let len = text.chars().count();
                if offset <= pos + len {
                    let at = offset.saturating_sub(pos);
                    let head = char_slice(text, 0, at);
                    let tail = char_slice(text, at, len);
                    *text = format!("{head}{insert}{tail}");
                    return;
                }
                pos += len;
            }
        }
    }
    // offset past the last leaf: append an unmarked leaf
    content.push(Inline::text(insert));
    merge_adjacent(content);
}

fn toggle_mark_span(content: &mut Vec<Inline>, start: usize, end: usize, mark: &Mark) {
    // First pass: does every overlapped text leaf already carry the type?
    let mut any_text = false;
    let mut all_marked = true;
    let mut pos = 0usize;
    for inline in content.iter() {
        match inline {
            Inline::HardBreak => pos += 1,
            Inline::Text { text, marks } => {
                let len = text.chars().count();
                let overlaps = pos < end && pos + len > start;
                if overlaps && len > 0 {
                    any_text = true;
                    if !marks.iter().any(|m| m.same_type(mark)) {
                        all_marked = false;
                    }
                }
                pos += len;
            }
        }
    }
    if !any_text {
        return;
    }
    let adding = !all_marked;

    // Second pass: split leaves at the range boundaries and rewrite the
    // covered segments
    let mut out = Vec::with_capacity(content.len() + 2);
    let mut pos = 0usize;
    for inline in content.drain(..) {
        match inline {
            Inline::HardBreak => {
                out.push(Inline::HardBreak);
                pos += 1;
            }
            Inline::Text { text, marks } => {
                let len = text.chars().count();
                let leaf_start = pos;
                let leaf_end = pos + len;
                if leaf_end <= start || leaf_start >= end {
                    out.push(Inline::Text { text, marks });
                } else {
                    let mid_from = start.saturating_sub(leaf_start);
                    let mid_to = (end - leaf_start).min(len);
                    let head = char_slice(&text, 0, mid_from);
                    let mid = char_slice(&text, mid_from, mid_to);
                    let tail = char_slice(&text, mid_to, len);
                    if !head.is_empty() {
                        out.push(Inline::Text {
                            text: head,
                            marks: marks.clone(),
                        });
                    }
                    if !mid.is_empty() {
                        let mut mid_marks: Vec<Mark> = marks
                            .iter()
                            .filter(|m| !m.same_type(mark))
                            .cloned()
                            .collect();
                        if adding {
                            mid_marks.push(mark.clone());
                            normalize_marks(&mut mid_marks);
                        }
                        out.push(Inline::Text {
                            text: mid,
                            marks: mid_marks,
                        });
                    }
                    if !tail.is_empty() {
                        out.push(Inline::Text { text: tail, marks });
                    }
                }
                pos = leaf_end;
            }
        }
    }
    *content = out;
    merge_adjacent(content);
}

/// Insert a run of inline nodes at a character offset, splitting the leaf
/// the offset falls inside
fn splice_inlines(content: &mut Vec<Inline>, offset: usize, insert: Vec<Inline>) {
    let mut out = Vec::with_capacity(content.len() + insert.len());
    let mut pos = 0usize;
    let mut pending = Some(insert);
    for inline in content.drain(..) {
        match inline {
            Inline::HardBreak => {
                if pos >= offset {
                    if let Some(ins) = pending.take() {
                        out.extend(ins);
                    }
                }
                out.push(Inline::HardBreak);
                pos += 1;
            }
            Inline::Text { text, marks } => {
                let len = text.chars().count();
                if pending.is_some() && offset <= pos + len {
                    let at = offset.saturating_sub(pos);
                    let head = char_slice(&text, 0, at);
                    let tail = char_slice(&text, at, len);
                    if !head.is_empty() {
                        out.push(Inline::Text {
                            text: head,
                            marks: marks.clone(),
                        });
                    }
                    if let Some(ins) = pending.take() {
                        out.extend(ins);
                    }
                    if !tail.is_empty() {
                        out.push(Inline::Text { text: tail, marks });
                    }
                } else {
                    out.push(Inline::Text { text, marks });
                }
                pos += len;
            }
        }
    }
    if let Some(ins) = pending.take() {
        out.extend(ins);
    }
    *content = out;
    merge_adjacent(content);
}

/// Merge adjacent text leaves carrying identical mark sets
fn merge_adjacent(content: &mut Vec<Inline>) {
    let mut out: Vec<Inline> = Vec::with_capacity(content.len());
    for inline in content.drain(..) {
        match (out.last_mut(), inline) {
            (
                Some(Inline::Text { text: prev, marks: prev_marks }),
                Inline::Text { text, marks },
            ) if *prev_marks == marks => {
                prev.push_str(&text);
            }
            (_, inline) => out.push(inline),
        }
    }
    *content = out;
}

fn convert_kind(kind: BlockKind, target: &BlockType) -> Result<BlockKind, BlockKind> {
    // Extract the source content in both representations
    let (inline, raw) = match &kind {
        BlockKind::Paragraph { content } | BlockKind::Heading { content, .. } => {
            let raw: String = content.iter().map(Inline::plain_text).collect();
            (Some(content.clone()), raw)
        }
        BlockKind::CodeBlock { code, .. } => (None, code.clone()),
        BlockKind::MathBlock { expr } => (None, expr.clone()),
        _ => return Err(kind),
    };
    let as_inline = |raw: &str| -> Vec<Inline> {
        if raw.is_empty() {
            Vec::new()
        } else {
            vec![Inline::text(raw)]
        }
    };
    Ok(match target {
        BlockType::Paragraph => BlockKind::Paragraph {
            content: inline.unwrap_or_else(|| as_inline(&raw)),
        },
        BlockType::Heading(level) => BlockKind::Heading {
            level: (*level).clamp(1, 6),
            content: inline.unwrap_or_else(|| as_inline(&raw)),
        },
        BlockType::CodeBlock { language } => BlockKind::CodeBlock {
            language: language.clone(),
            code: raw,
        },
        BlockType::MathBlock => BlockKind::MathBlock { expr: raw },
    })
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;
