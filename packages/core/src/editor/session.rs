//! Editing Session
//!
//! Owns the document tree plus the per-placeholder upload state, and
//! interprets the effect descriptions the upload machine emits. Upload
//! completions are addressed by block id, so a completion that arrives
//! after its placeholder was deleted or resolved is dropped silently.

use std::collections::HashMap;

use crate::editor::commands::{self, CommandItem, CommandOutcome, CommandSpec, CursorContext};
use crate::editor::document::{Cursor, Document};
use crate::editor::error::EditorError;
use crate::editor::upload::{
    transition, FileUpload, ImageStore, PlaceholderState, UploadError, UploadEffect, UploadEvent,
    UploadedImage,
};
use crate::models::{Block, BlockId, BlockKind, ImageAttrs};

/// One open editor: the document and the transient state of every
/// unresolved image placeholder in it
#[derive(Debug, Default)]
pub struct EditorSession {
    document: Document,
    placeholders: HashMap<BlockId, PlaceholderState>,
}

impl EditorSession {
    /// Session over an empty document
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            placeholders: HashMap::new(),
        }
    }

    /// Session over an existing document. Any placeholder blocks already in
    /// the tree get a fresh idle state.
    pub fn with_document(document: Document) -> Self {
        let mut placeholders = HashMap::new();
        for block in document.blocks() {
            collect_placeholders(block, &mut placeholders);
        }
        Self {
            document,
            placeholders,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Transient state of a placeholder block, if it is still unresolved
    pub fn placeholder_state(&self, id: BlockId) -> Option<&PlaceholderState> {
        self.placeholders.get(&id)
    }

    /// Insert a new image placeholder after the given block and register
    /// its idle upload state
    pub fn insert_image_placeholder(&mut self, after: BlockId) -> Result<BlockId, EditorError> {
        let id = self
            .document
            .insert_after(after, Block::image_placeholder())?;
        self.placeholders.insert(id, PlaceholderState::new());
        Ok(id)
    }

    /// Run a palette command, keeping the placeholder registry in sync when
    /// the command inserts an image placeholder
    pub fn run_command(
        &mut self,
        ctx: &CursorContext,
        item: &CommandItem,
        prompt: Option<&str>,
    ) -> Result<CommandOutcome, EditorError> {
        let outcome = commands::execute(&mut self.document, ctx, item, prompt)?;
        if let (CommandSpec::ImagePlaceholder, CommandOutcome::Applied { focus }) =
            (item.spec, &outcome)
        {
            self.placeholders.insert(*focus, PlaceholderState::new());
        }
        Ok(outcome)
    }

    /// Feed one event to a placeholder's upload machine and apply the
    /// synchronous effects.
    ///
    /// Returns the file to upload when the event started an attempt; the
    /// caller hands it to an [`ImageStore`] and reports back through
    /// [`complete_upload`](Self::complete_upload).
    pub fn handle_upload_event(
        &mut self,
        id: BlockId,
        event: UploadEvent,
    ) -> Result<Option<FileUpload>, EditorError> {
        let state = self
            .placeholders
            .remove(&id)
            .ok_or(EditorError::NotAPlaceholder { id })?;
        let (next, effects) = transition(state, event);
        self.placeholders.insert(id, next);

        let mut pending = None;
        for effect in effects {
            match effect {
                UploadEffect::StartUpload(file) => pending = Some(file),
                UploadEffect::ReplaceWithImage { src } => self.resolve_placeholder(id, &src)?,
                UploadEffect::RemoveBlock => {
                    self.placeholders.remove(&id);
                    self.document.remove_block(id)?;
                }
            }
        }
        Ok(pending)
    }

    /// Report the outcome of an upload attempt started earlier.
    ///
    /// Completions are matched by block id. If the placeholder was deleted
    /// or already resolved while the upload was in flight, the completion
    /// is dropped without touching the document.
    pub fn complete_upload(
        &mut self,
        id: BlockId,
        result: Result<UploadedImage, UploadError>,
    ) -> Result<(), EditorError> {
        if !self.placeholders.contains_key(&id) || !self.document.contains(id) {
            tracing::debug!(block = %id, "dropping stale upload completion");
            return Ok(());
        }
        let event = match result {
            Ok(image) => UploadEvent::UploadSucceeded { url: image.url },
            Err(e) => UploadEvent::UploadFailed {
                message: e.to_string(),
            },
        };
        self.handle_upload_event(id, event)?;
        Ok(())
    }

    /// Full upload flow: drop the file on the placeholder, run the store
    /// upload, and apply the completion
    pub async fn upload_file(
        &mut self,
        id: BlockId,
        file: FileUpload,
        store: &dyn ImageStore,
    ) -> Result<(), EditorError> {
        if let Some(file) = self.handle_upload_event(id, UploadEvent::Drop(file))? {
            let result = store.upload(&file).await;
            self.complete_upload(id, result)?;
        }
        Ok(())
    }

    /// Swap the placeholder for a resolved image in the same tree position
    fn resolve_placeholder(&mut self, id: BlockId, src: &str) -> Result<(), EditorError> {
        match self.document.find(id).map(|b| &b.kind) {
            Some(BlockKind::ImagePlaceholder) => {}
            Some(_) => return Err(EditorError::NotAPlaceholder { id }),
            None => return Err(EditorError::BlockNotFound { id }),
        }
        let image = Block::image(ImageAttrs::new(src));
        self.document.replace_block(id, image)?;
        self.placeholders.remove(&id);
        tracing::debug!(block = %id, "placeholder resolved to image");
        Ok(())
    }

    /// Parse a memo's Markdown and splice it at the cursor
    pub fn insert_memo(&mut self, cursor: &Cursor, markdown: &str) -> Result<(), EditorError> {
        let fragment = crate::markdown::parse_fragment(markdown);
        self.document.splice_fragment(cursor, fragment)
    }

    /// Serialize the document for persistence. Unresolved placeholders are
    /// omitted, so a saved draft never contains one.
    pub fn to_markdown(&self) -> String {
        crate::markdown::serialize(&self.document)
    }

    /// Snapshot the document as a draft payload for a [`Publisher`]
    ///
    /// [`Publisher`]: crate::draft::Publisher
    pub fn draft(&self, category: crate::classify::Category) -> crate::draft::PostDraft {
        crate::draft::PostDraft::from_content(self.to_markdown(), category)
    }
}

fn collect_placeholders(block: &Block, into: &mut HashMap<BlockId, PlaceholderState>) {
    if matches!(block.kind, BlockKind::ImagePlaceholder) {
        into.insert(block.id, PlaceholderState::new());
    }
    if let Some(children) = block.kind.child_blocks() {
        for child in children {
            collect_placeholders(child, into);
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
