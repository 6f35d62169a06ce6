// Host document adapter.
//
// The host editor executes work in batches: callers queue reads and writes,
// then flush the batch in one round trip, and only after the flush are read
// values available. `DocumentHost` is that round trip; `run_batch` scopes a
// batch so it is flushed on every exit path; `DocumentSurface` is the
// operation-level contract the rest of the panel consumes.

pub mod memory;

use std::sync::Arc;

use tracing::debug;
use wordassist_common::types::Mode;

use crate::error::DocumentError;
use crate::BoxFuture;

pub use memory::MemoryDocument;

// ── Batch ───────────────────────────────────────────────────────────

/// One queued host operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    ReadSelection,
    ReadBody,
    ReplaceBody(String),
    ReplaceSelection(String),
    /// New paragraph anchored at the end of the selection.
    InsertParagraphAfterSelection(String),
    InsertParagraphAtEnd(String),
}

impl BatchOp {
    pub fn is_read(&self) -> bool {
        matches!(self, Self::ReadSelection | Self::ReadBody)
    }
}

/// Ticket for a queued read, redeemable once the batch has been flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadHandle(usize);

/// Queue of operations awaiting a flush.
#[derive(Debug, Default)]
pub struct DocumentBatch {
    ops: Vec<BatchOp>,
    reads: usize,
}

impl DocumentBatch {
    pub fn read_selection(&mut self) -> ReadHandle {
        self.queue_read(BatchOp::ReadSelection)
    }

    pub fn read_body(&mut self) -> ReadHandle {
        self.queue_read(BatchOp::ReadBody)
    }

    pub fn replace_body(&mut self, text: &str) {
        self.ops.push(BatchOp::ReplaceBody(text.to_string()));
    }

    pub fn replace_selection(&mut self, text: &str) {
        self.ops.push(BatchOp::ReplaceSelection(text.to_string()));
    }

    pub fn insert_paragraph_after_selection(&mut self, text: &str) {
        self.ops.push(BatchOp::InsertParagraphAfterSelection(text.to_string()));
    }

    pub fn insert_paragraph_at_end(&mut self, text: &str) {
        self.ops.push(BatchOp::InsertParagraphAtEnd(text.to_string()));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    fn queue_read(&mut self, op: BatchOp) -> ReadHandle {
        let handle = ReadHandle(self.reads);
        self.reads += 1;
        self.ops.push(op);
        handle
    }
}

/// Read values returned by a flushed batch, in queue order.
#[derive(Debug, Default)]
pub struct SyncedReads {
    values: Vec<Option<String>>,
}

impl SyncedReads {
    /// Take the value of a queued read. Each handle can be redeemed once.
    pub fn take(&mut self, handle: ReadHandle) -> Result<String, DocumentError> {
        self.values.get_mut(handle.0).and_then(Option::take).ok_or(DocumentError::MissingRead)
    }
}

/// The host editor's batched execution entry point.
pub trait DocumentHost: Send + Sync {
    /// Execute `ops` in order and return the value of every read op, in the
    /// order the reads were queued.
    fn sync(&self, ops: Vec<BatchOp>) -> BoxFuture<'_, Result<Vec<String>, DocumentError>>;
}

impl<H: DocumentHost + ?Sized> DocumentHost for Arc<H> {
    fn sync(&self, ops: Vec<BatchOp>) -> BoxFuture<'_, Result<Vec<String>, DocumentError>> {
        (**self).sync(ops)
    }
}

/// Acquire a batch, let `build` queue work on it, and flush it.
///
/// The flush happens even when `build` fails, so writes queued before the
/// failure are not silently dropped; the `build` error is then returned.
pub async fn run_batch<H, F, T>(host: &H, build: F) -> Result<(T, SyncedReads), DocumentError>
where
    H: DocumentHost + ?Sized,
    F: FnOnce(&mut DocumentBatch) -> Result<T, DocumentError>,
{
    let mut batch = DocumentBatch::default();
    let built = build(&mut batch);
    let expected_reads = batch.reads;
    debug!(ops = batch.len(), reads = expected_reads, "flushing document batch");

    let flushed = host.sync(batch.ops).await;
    let value = built?;
    let values = flushed?;
    if values.len() != expected_reads {
        return Err(DocumentError::MissingRead);
    }

    Ok((value, SyncedReads { values: values.into_iter().map(Some).collect() }))
}

// ── Surface ─────────────────────────────────────────────────────────

/// Operation-level document contract used by the panel core.
pub trait DocumentSurface: Send + Sync {
    /// Text of the current selection; empty when nothing is selected.
    fn read_selection_text(&self) -> BoxFuture<'_, Result<String, DocumentError>>;

    fn read_whole_document_text(&self) -> BoxFuture<'_, Result<String, DocumentError>>;

    fn replace_whole_document_text<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), DocumentError>>;

    /// REWRITE replaces the selection, EXPLAIN inserts after it, DOCUMENT
    /// replaces the whole document.
    fn apply_mode_edit<'a>(
        &'a self,
        mode: Mode,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), DocumentError>>;

    fn insert_paragraph_at_end<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), DocumentError>>;
}

/// `DocumentSurface` implemented as one scoped batch per operation.
#[derive(Debug)]
pub struct BatchedSurface<H> {
    host: H,
}

impl<H: DocumentHost> BatchedSurface<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    async fn read(
        &self,
        select: fn(&mut DocumentBatch) -> ReadHandle,
    ) -> Result<String, DocumentError> {
        let (handle, mut reads) = run_batch(&self.host, |batch| Ok(select(batch))).await?;
        reads.take(handle)
    }

    async fn write<F>(&self, queue: F) -> Result<(), DocumentError>
    where
        F: FnOnce(&mut DocumentBatch) + Send,
    {
        run_batch(&self.host, |batch| {
            queue(batch);
            Ok(())
        })
        .await
        .map(|_| ())
    }
}

impl<H: DocumentHost> DocumentSurface for BatchedSurface<H> {
    fn read_selection_text(&self) -> BoxFuture<'_, Result<String, DocumentError>> {
        Box::pin(self.read(DocumentBatch::read_selection))
    }

    fn read_whole_document_text(&self) -> BoxFuture<'_, Result<String, DocumentError>> {
        Box::pin(self.read(DocumentBatch::read_body))
    }

    fn replace_whole_document_text<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), DocumentError>> {
        Box::pin(self.write(move |batch| batch.replace_body(text)))
    }

    fn apply_mode_edit<'a>(
        &'a self,
        mode: Mode,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), DocumentError>> {
        Box::pin(self.write(move |batch| match mode {
            Mode::Rewrite => batch.replace_selection(text),
            Mode::Explain => batch.insert_paragraph_after_selection(text),
            Mode::Document => batch.replace_body(text),
        }))
    }

    fn insert_paragraph_at_end<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), DocumentError>> {
        Box::pin(self.write(move |batch| batch.insert_paragraph_at_end(text)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every flushed batch and answers reads with a fixed value.
    #[derive(Default)]
    struct RecordingHost {
        flushed: Mutex<Vec<Vec<BatchOp>>>,
        fail: bool,
    }

    impl DocumentHost for RecordingHost {
        fn sync(&self, ops: Vec<BatchOp>) -> BoxFuture<'_, Result<Vec<String>, DocumentError>> {
            let reads = ops.iter().filter(|op| op.is_read()).map(|_| "value".to_string()).collect();
            self.flushed.lock().unwrap().push(ops);
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(DocumentError::Host("sync rejected".into()))
                } else {
                    Ok(reads)
                }
            })
        }
    }

    #[tokio::test]
    async fn reads_resolve_after_flush() {
        let host = RecordingHost::default();
        let ((selection, body), mut reads) = run_batch(&host, |batch| {
            let selection = batch.read_selection();
            batch.replace_selection("x");
            let body = batch.read_body();
            Ok((selection, body))
        })
        .await
        .unwrap();

        assert_eq!(reads.take(selection).unwrap(), "value");
        assert_eq!(reads.take(body).unwrap(), "value");
        assert_eq!(reads.take(body), Err(DocumentError::MissingRead));
        assert_eq!(host.flushed.lock().unwrap()[0].len(), 3);
    }

    #[tokio::test]
    async fn batch_is_flushed_when_builder_fails() {
        let host = RecordingHost::default();
        let result = run_batch(&host, |batch| -> Result<(), DocumentError> {
            batch.insert_paragraph_at_end("queued before failure");
            Err(DocumentError::Host("builder failed".into()))
        })
        .await;

        assert_eq!(result.unwrap_err(), DocumentError::Host("builder failed".into()));
        let flushed = host.flushed.lock().unwrap();
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0], vec![BatchOp::InsertParagraphAtEnd("queued before failure".into())]);
    }

    #[tokio::test]
    async fn host_failure_propagates() {
        let host = RecordingHost { fail: true, ..Default::default() };
        let surface = BatchedSurface::new(host);
        let error = surface.read_selection_text().await.unwrap_err();
        assert_eq!(error, DocumentError::Host("sync rejected".into()));
    }

    #[tokio::test]
    async fn mode_edits_map_to_host_ops() {
        let surface = BatchedSurface::new(RecordingHost::default());
        surface.apply_mode_edit(Mode::Rewrite, "a").await.unwrap();
        surface.apply_mode_edit(Mode::Explain, "b").await.unwrap();
        surface.apply_mode_edit(Mode::Document, "c").await.unwrap();

        let flushed = surface.host().flushed.lock().unwrap();
        assert_eq!(
            flushed.iter().flatten().cloned().collect::<Vec<_>>(),
            vec![
                BatchOp::ReplaceSelection("a".into()),
                BatchOp::InsertParagraphAfterSelection("b".into()),
                BatchOp::ReplaceBody("c".into()),
            ]
        );
    }
}
