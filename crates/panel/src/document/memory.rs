// In-memory document host: plain text plus a selection range.
//
// Used as the reference host for the panel core and by tests. Offsets are
// byte offsets on char boundaries.

use std::ops::Range;
use std::sync::{Mutex, MutexGuard};

use super::{BatchOp, DocumentHost};
use crate::error::DocumentError;
use crate::BoxFuture;

#[derive(Debug, Default)]
struct DocState {
    text: String,
    selection: Range<usize>,
}

#[derive(Debug, Default)]
pub struct MemoryDocument {
    state: Mutex<DocState>,
}

impl MemoryDocument {
    /// A document with a collapsed selection at the start.
    pub fn new(text: impl Into<String>) -> Self {
        Self { state: Mutex::new(DocState { text: text.into(), selection: 0..0 }) }
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    pub fn selection(&self) -> Range<usize> {
        self.lock().selection.clone()
    }

    pub fn selected_text(&self) -> String {
        let state = self.lock();
        state.text[state.selection.clone()].to_string()
    }

    /// Select a byte range. Fails when the range is out of bounds or splits
    /// a character.
    pub fn select(&self, range: Range<usize>) -> Result<(), DocumentError> {
        let mut state = self.lock();
        if range.start > range.end
            || range.end > state.text.len()
            || !state.text.is_char_boundary(range.start)
            || !state.text.is_char_boundary(range.end)
        {
            return Err(DocumentError::Host(format!("invalid selection {range:?}")));
        }
        state.selection = range;
        Ok(())
    }

    /// Select the first occurrence of `needle`. Returns false when absent.
    pub fn select_text(&self, needle: &str) -> bool {
        let mut state = self.lock();
        match state.text.find(needle) {
            Some(start) => {
                state.selection = start..start + needle.len();
                true
            }
            None => false,
        }
    }

    /// Collapse the selection to a caret at its start.
    pub fn deselect(&self) {
        let mut state = self.lock();
        let start = state.selection.start;
        state.selection = start..start;
    }

    fn lock(&self) -> MutexGuard<'_, DocState> {
        // Ops never leave the state half-updated, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn execute(&self, ops: Vec<BatchOp>) -> Vec<String> {
        let mut state = self.lock();
        let mut reads = Vec::new();

        for op in ops {
            match op {
                BatchOp::ReadSelection => {
                    reads.push(state.text[state.selection.clone()].to_string());
                }
                BatchOp::ReadBody => reads.push(state.text.clone()),
                BatchOp::ReplaceBody(text) => {
                    state.text = text;
                    state.selection = 0..0;
                }
                BatchOp::ReplaceSelection(text) => {
                    let Range { start, end } = state.selection.clone();
                    state.text.replace_range(start..end, &text);
                    state.selection = start..start + text.len();
                }
                BatchOp::InsertParagraphAfterSelection(text) => {
                    let at = state.selection.end;
                    let paragraph = paragraph_at(&state.text, at, &text);
                    state.text.insert_str(at, &paragraph);
                }
                BatchOp::InsertParagraphAtEnd(text) => {
                    if !state.text.is_empty() {
                        state.text.push('\n');
                    }
                    state.text.push_str(&text);
                }
            }
        }

        reads
    }
}

/// `text` as its own paragraph when inserted at byte offset `at`. Newlines
/// are added only where `at` is not already a paragraph boundary.
fn paragraph_at(doc: &str, at: usize, text: &str) -> String {
    let before = &doc[..at];
    let after = &doc[at..];
    let mut paragraph = String::with_capacity(text.len() + 2);
    if !before.is_empty() && !before.ends_with('\n') {
        paragraph.push('\n');
    }
    paragraph.push_str(text);
    if !after.is_empty() && !after.starts_with('\n') {
        paragraph.push('\n');
    }
    paragraph
}

impl DocumentHost for MemoryDocument {
    fn sync(&self, ops: Vec<BatchOp>) -> BoxFuture<'_, Result<Vec<String>, DocumentError>> {
        let reads = self.execute(ops);
        Box::pin(async move { Ok(reads) })
    }
}
