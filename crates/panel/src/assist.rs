// Assist request cycle: validate, snapshot, resolve, call, apply, commit.

use std::sync::Arc;

use tracing::{info, warn};
use wordassist_common::protocol::assist::AssistRequest;
use wordassist_common::types::{ClientId, Mode};

use crate::context::{ContextResolver, ContextSource};
use crate::document::DocumentSurface;
use crate::error::{PanelError, ValidationError};
use crate::remote::AssistService;
use crate::snapshot::{DocumentSnapshot, SnapshotCursor, SnapshotManager};

/// Result of a completed assist run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistOutcome {
    pub mode: Mode,
    /// Server-side log id, when the service reported one.
    pub log_id: Option<i64>,
    pub context_source: ContextSource,
    pub answer_len: usize,
}

/// Drives one assist run at a time and owns the undo/redo snapshots.
pub struct AssistOrchestrator {
    surface: Arc<dyn DocumentSurface>,
    service: Arc<dyn AssistService>,
    snapshots: SnapshotManager,
    explain_heading: Option<String>,
}

impl AssistOrchestrator {
    pub fn new(surface: Arc<dyn DocumentSurface>, service: Arc<dyn AssistService>) -> Self {
        Self { surface, service, snapshots: SnapshotManager::default(), explain_heading: None }
    }

    /// Prefix inserted explanations with a heading line.
    pub fn with_explain_heading(mut self, heading: Option<String>) -> Self {
        self.explain_heading = heading.filter(|heading| !heading.trim().is_empty());
        self
    }

    pub fn surface(&self) -> &Arc<dyn DocumentSurface> {
        &self.surface
    }

    pub fn service(&self) -> &Arc<dyn AssistService> {
        &self.service
    }

    pub fn can_undo(&self) -> bool {
        self.snapshots.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.snapshots.can_redo()
    }

    pub fn snapshot_cursor(&self) -> SnapshotCursor {
        self.snapshots.cursor()
    }

    /// Run one assist cycle.
    ///
    /// Failures before the edit leave the document and the snapshots alone.
    /// A failed edit is reported as a document error without a commit; the
    /// host may have applied part of it. A failed read after a successful
    /// edit is a `PartialApplication`.
    pub async fn run(
        &mut self,
        client_id: &ClientId,
        mode: Mode,
        instruction: &str,
        resolver: &ContextResolver,
    ) -> Result<AssistOutcome, PanelError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ValidationError::EmptyInstruction.into());
        }

        let before = DocumentSnapshot::new(self.surface.read_whole_document_text().await?);
        let context = resolver.resolve(mode, self.surface.as_ref()).await?;

        let request = AssistRequest::new(client_id.clone(), mode, context.text, instruction);
        let response = self.service.assist(&request).await.inspect_err(|error| {
            warn!(%mode, status = ?error.status(), "assist request failed");
        })?;

        if !mode.accepts_empty_answer() && response.answer.trim().is_empty() {
            return Err(ValidationError::EmptyResponse.into());
        }

        self.apply(mode, &response.answer).await?;

        let after = match self.surface.read_whole_document_text().await {
            Ok(text) => DocumentSnapshot::new(text),
            Err(error) => {
                warn!(%mode, %error, "post-edit read failed; snapshots not committed");
                return Err(PanelError::PartialApplication {
                    detail: format!("the result could not be read back for undo: {error}"),
                });
            }
        };
        self.snapshots.commit(before, after);

        info!(
            %mode,
            log_id = ?response.log_id,
            context_len = request.context_text.len(),
            answer_len = response.answer.len(),
            "assist applied"
        );
        Ok(AssistOutcome {
            mode,
            log_id: response.log_id,
            context_source: context.source,
            answer_len: response.answer.len(),
        })
    }

    /// Restore the pre-assist document. `Ok(false)` when undo is unavailable.
    pub async fn undo(&mut self) -> Result<bool, PanelError> {
        Ok(self.snapshots.undo(self.surface.as_ref()).await?)
    }

    /// Re-apply the post-assist document. `Ok(false)` when redo is unavailable.
    pub async fn redo(&mut self) -> Result<bool, PanelError> {
        Ok(self.snapshots.redo(self.surface.as_ref()).await?)
    }

    async fn apply(&self, mode: Mode, answer: &str) -> Result<(), PanelError> {
        match mode {
            Mode::Document => self.surface.replace_whole_document_text(answer).await?,
            Mode::Explain => match &self.explain_heading {
                Some(heading) => {
                    let text = format!("{heading}\n{answer}");
                    self.surface.apply_mode_edit(mode, &text).await?;
                }
                None => self.surface.apply_mode_edit(mode, answer).await?,
            },
            Mode::Rewrite => self.surface.apply_mode_edit(mode, answer).await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use wordassist_common::protocol::assist::AssistResponse;

    use super::*;
    use crate::document::{BatchedSurface, MemoryDocument};
    use crate::error::{DocumentError, ErrorKind, RemoteError};
    use crate::BoxFuture;

    /// Answers every request with a fixed result and records what it saw.
    struct ScriptedService {
        reply: Result<AssistResponse, RemoteError>,
        seen: Mutex<Vec<AssistRequest>>,
    }

    impl ScriptedService {
        fn answering(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(AssistResponse { log_id: Some(7), answer: answer.to_string() }),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: RemoteError) -> Arc<Self> {
            Arc::new(Self { reply: Err(error), seen: Mutex::new(Vec::new()) })
        }

        fn requests(&self) -> Vec<AssistRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl AssistService for ScriptedService {
        fn assist<'a>(
            &'a self,
            request: &'a AssistRequest,
        ) -> BoxFuture<'a, Result<AssistResponse, RemoteError>> {
            self.seen.lock().unwrap().push(request.clone());
            let reply = self.reply.clone();
            Box::pin(async move { reply })
        }

        fn ping(&self) -> BoxFuture<'_, Result<String, RemoteError>> {
            Box::pin(async { Ok("pong".to_string()) })
        }
    }

    /// Document surface whose edits or post-edit reads can be made to fail.
    /// The first whole-document read always succeeds.
    struct FlakySurface {
        text: Mutex<String>,
        fail_edit: AtomicBool,
        fail_read_back: bool,
        whole_reads: AtomicUsize,
    }

    impl FlakySurface {
        fn new(text: &str, fail_edit: bool, fail_read_back: bool) -> Arc<Self> {
            Arc::new(Self {
                text: Mutex::new(text.to_string()),
                fail_edit: AtomicBool::new(fail_edit),
                fail_read_back,
                whole_reads: AtomicUsize::new(0),
            })
        }

        fn text(&self) -> String {
            self.text.lock().unwrap().clone()
        }
    }

    impl DocumentSurface for FlakySurface {
        fn read_selection_text(&self) -> BoxFuture<'_, Result<String, DocumentError>> {
            Box::pin(async { Ok(String::new()) })
        }

        fn read_whole_document_text(&self) -> BoxFuture<'_, Result<String, DocumentError>> {
            let first = self.whole_reads.fetch_add(1, Ordering::SeqCst) == 0;
            let result = if !first && self.fail_read_back {
                Err(DocumentError::Host("read timed out".into()))
            } else {
                Ok(self.text())
            };
            Box::pin(async move { result })
        }

        fn replace_whole_document_text<'a>(
            &'a self,
            text: &'a str,
        ) -> BoxFuture<'a, Result<(), DocumentError>> {
            Box::pin(async move {
                if self.fail_edit.load(Ordering::SeqCst) {
                    return Err(DocumentError::Host("edit rejected".into()));
                }
                *self.text.lock().unwrap() = text.to_string();
                Ok(())
            })
        }

        fn apply_mode_edit<'a>(
            &'a self,
            _mode: Mode,
            text: &'a str,
        ) -> BoxFuture<'a, Result<(), DocumentError>> {
            self.replace_whole_document_text(text)
        }

        fn insert_paragraph_at_end<'a>(
            &'a self,
            _text: &'a str,
        ) -> BoxFuture<'a, Result<(), DocumentError>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn setup(
        text: &str,
        service: Arc<ScriptedService>,
    ) -> (Arc<BatchedSurface<Arc<MemoryDocument>>>, AssistOrchestrator) {
        let surface = Arc::new(BatchedSurface::new(Arc::new(MemoryDocument::new(text))));
        let orchestrator = AssistOrchestrator::new(surface.clone(), service);
        (surface, orchestrator)
    }

    fn client() -> ClientId {
        ClientId::parse("client-a").unwrap()
    }

    #[tokio::test]
    async fn rewrite_replaces_selection_and_enables_undo() {
        let service = ScriptedService::answering("Shortened.");
        let (surface, mut orchestrator) = setup("Intro. A long sentence.", service.clone());
        assert!(surface.host().select_text("A long sentence."));

        let outcome = orchestrator
            .run(&client(), Mode::Rewrite, "  Shorten this ", &ContextResolver::default())
            .await
            .unwrap();

        assert_eq!(outcome.log_id, Some(7));
        assert_eq!(outcome.context_source, ContextSource::LiveSelection);
        assert_eq!(surface.host().text(), "Intro. Shortened.");
        assert!(orchestrator.can_undo());

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].instruction, "Shorten this");
        assert_eq!(requests[0].context_text, "A long sentence.");
    }

    #[tokio::test]
    async fn blank_instruction_fails_before_any_request() {
        let service = ScriptedService::answering("unused");
        let (_surface, mut orchestrator) = setup("text", service.clone());

        let error = orchestrator
            .run(&client(), Mode::Document, " \t", &ContextResolver::default())
            .await
            .unwrap_err();

        assert!(matches!(error, PanelError::Validation(ValidationError::EmptyInstruction)));
        assert!(service.requests().is_empty());
    }

    #[tokio::test]
    async fn explain_without_context_never_calls_service() {
        let service = ScriptedService::answering("unused");
        let (_surface, mut orchestrator) = setup("no selection here", service.clone());

        let error = orchestrator
            .run(&client(), Mode::Explain, "Explain", &ContextResolver::default())
            .await
            .unwrap_err();

        assert!(matches!(error, PanelError::Validation(ValidationError::SelectionRequired)));
        assert!(service.requests().is_empty());
        assert_eq!(orchestrator.snapshot_cursor(), SnapshotCursor::None);
    }

    #[tokio::test]
    async fn empty_explanation_is_rejected_and_document_untouched() {
        let service = ScriptedService::answering("  \n");
        let (surface, mut orchestrator) = setup("E=mc²", service);
        assert!(surface.host().select_text("E=mc²"));

        let error = orchestrator
            .run(&client(), Mode::Explain, "Explain", &ContextResolver::default())
            .await
            .unwrap_err();

        assert!(matches!(error, PanelError::Validation(ValidationError::EmptyResponse)));
        assert_eq!(surface.host().text(), "E=mc²");
        assert!(!orchestrator.can_undo());
    }

    #[tokio::test]
    async fn remote_failure_leaves_document_and_snapshots() {
        let service =
            ScriptedService::failing(RemoteError::Status { status: 500, body: "boom".into() });
        let (surface, mut orchestrator) = setup("original", service);

        let error = orchestrator
            .run(&client(), Mode::Document, "Rewrite all", &ContextResolver::default())
            .await
            .unwrap_err();

        assert!(matches!(error, PanelError::Remote(RemoteError::Status { status: 500, .. })));
        assert_eq!(surface.host().text(), "original");
        assert_eq!(orchestrator.snapshot_cursor(), SnapshotCursor::None);
    }

    #[tokio::test]
    async fn document_mode_accepts_empty_answer_and_empty_document() {
        let service = ScriptedService::answering("");
        let (surface, mut orchestrator) = setup("", service.clone());

        orchestrator
            .run(&client(), Mode::Document, "Write nothing", &ContextResolver::default())
            .await
            .unwrap();

        assert_eq!(surface.host().text(), "");
        assert_eq!(service.requests()[0].context_text, "");
        assert!(orchestrator.can_undo());
    }

    #[tokio::test]
    async fn explain_heading_prefixes_inserted_paragraph() {
        let service = ScriptedService::answering("Mass-energy equivalence.");
        let (surface, orchestrator) = setup("E=mc²", service);
        let mut orchestrator =
            orchestrator.with_explain_heading(Some("--- Word Assistant ---".into()));
        assert!(surface.host().select_text("E=mc²"));

        orchestrator
            .run(&client(), Mode::Explain, "Explain", &ContextResolver::default())
            .await
            .unwrap();

        assert_eq!(
            surface.host().text(),
            "E=mc²\n--- Word Assistant ---\nMass-energy equivalence."
        );
    }

    #[tokio::test]
    async fn undo_and_redo_restore_exact_snapshots() {
        let service = ScriptedService::answering("new body");
        let (surface, mut orchestrator) = setup("old body", service);

        assert!(!orchestrator.undo().await.unwrap());
        orchestrator
            .run(&client(), Mode::Document, "Replace", &ContextResolver::default())
            .await
            .unwrap();

        assert!(orchestrator.undo().await.unwrap());
        assert_eq!(surface.host().text(), "old body");
        assert!(orchestrator.can_redo());

        assert!(orchestrator.redo().await.unwrap());
        assert_eq!(surface.host().text(), "new body");
        assert!(!orchestrator.redo().await.unwrap());
    }

    #[tokio::test]
    async fn failed_edit_is_document_error_without_commit() {
        let surface = FlakySurface::new("original", true, false);
        let mut orchestrator =
            AssistOrchestrator::new(surface.clone(), ScriptedService::answering("new"));

        let error = orchestrator
            .run(&client(), Mode::Document, "Rewrite", &ContextResolver::default())
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Document);
        assert!(matches!(error, PanelError::Document(DocumentError::Host(_))));
        assert_eq!(surface.text(), "original");
        assert_eq!(orchestrator.snapshot_cursor(), SnapshotCursor::None);
        assert!(!orchestrator.can_undo());
    }

    #[tokio::test]
    async fn failed_read_back_is_partial_application_without_commit() {
        let surface = FlakySurface::new("original", false, true);
        let mut orchestrator =
            AssistOrchestrator::new(surface.clone(), ScriptedService::answering("new"));

        let error = orchestrator
            .run(&client(), Mode::Document, "Rewrite", &ContextResolver::default())
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::PartialApplication);
        assert!(matches!(error, PanelError::PartialApplication { .. }));
        assert_eq!(surface.text(), "new");
        assert_eq!(orchestrator.snapshot_cursor(), SnapshotCursor::None);
        assert!(!orchestrator.can_undo());
    }

    #[tokio::test]
    async fn failed_run_keeps_previous_undo_pair() {
        let service = ScriptedService::answering("second");
        let surface = FlakySurface::new("first", false, false);
        let mut orchestrator = AssistOrchestrator::new(surface.clone(), service);
        orchestrator
            .run(&client(), Mode::Document, "Rewrite", &ContextResolver::default())
            .await
            .unwrap();
        assert!(orchestrator.can_undo());

        surface.fail_edit.store(true, Ordering::SeqCst);
        orchestrator
            .run(&client(), Mode::Document, "Rewrite again", &ContextResolver::default())
            .await
            .unwrap_err();
        assert_eq!(surface.text(), "second");
        assert!(orchestrator.can_undo());

        assert!(orchestrator.undo().await.unwrap());
        assert_eq!(surface.text(), "first");
    }
}
