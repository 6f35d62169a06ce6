// Single-step undo/redo of whole-document content.
//
// Two slots and a cursor:
// - NONE: nothing to undo or redo (initial state)
// - AFTER: the latest assist result is in the document; undo is available
// - BEFORE: the latest assist result was undone; redo is available
//
// A new assist application overwrites both slots, so there is never more
// than one step in either direction.

use tracing::info;

use crate::document::DocumentSurface;
use crate::error::DocumentError;

/// Full document text captured at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot(String);

impl DocumentSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapshotCursor {
    #[default]
    None,
    After,
    Before,
}

#[derive(Debug, Default)]
pub struct SnapshotManager {
    undo_snapshot: Option<DocumentSnapshot>,
    redo_snapshot: Option<DocumentSnapshot>,
    cursor: SnapshotCursor,
}

impl SnapshotManager {
    pub fn cursor(&self) -> SnapshotCursor {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.undo_snapshot.is_some() && self.cursor == SnapshotCursor::After
    }

    pub fn can_redo(&self) -> bool {
        self.redo_snapshot.is_some() && self.cursor == SnapshotCursor::Before
    }

    /// Record a completed assist application, discarding any earlier pair.
    pub fn commit(&mut self, before: DocumentSnapshot, after: DocumentSnapshot) {
        self.undo_snapshot = Some(before);
        self.redo_snapshot = Some(after);
        self.cursor = SnapshotCursor::After;
    }

    /// Restore the pre-assist content. Returns `false` without touching the
    /// document when undo is not available.
    pub async fn undo(&mut self, surface: &dyn DocumentSurface) -> Result<bool, DocumentError> {
        if !self.can_undo() {
            return Ok(false);
        }
        let Some(snapshot) = self.undo_snapshot.as_ref() else {
            return Ok(false);
        };

        surface.replace_whole_document_text(snapshot.as_str()).await?;
        self.cursor = SnapshotCursor::Before;
        info!(restored_len = snapshot.len(), "undid last assist action");
        Ok(true)
    }

    /// Re-apply the post-assist content. Returns `false` without touching the
    /// document when redo is not available.
    pub async fn redo(&mut self, surface: &dyn DocumentSurface) -> Result<bool, DocumentError> {
        if !self.can_redo() {
            return Ok(false);
        }
        let Some(snapshot) = self.redo_snapshot.as_ref() else {
            return Ok(false);
        };

        surface.replace_whole_document_text(snapshot.as_str()).await?;
        self.cursor = SnapshotCursor::After;
        info!(restored_len = snapshot.len(), "redid last assist action");
        Ok(true)
    }
}
