// Panel state and user actions.
//
// `AssistPanel` is the single owner of everything the side panel shows:
// identity, mode, instruction, working context, snapshots, history page and
// the last error. Every user action clears the error surface when it starts;
// fallible ones record their failure when they end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};
use wordassist_common::types::{ClientId, Mode};

use crate::assist::{AssistOrchestrator, AssistOutcome};
use crate::config::PanelConfig;
use crate::context::ContextResolver;
use crate::document::DocumentSurface;
use crate::error::{ErrorSurface, PanelError, SurfacedError};
use crate::history::{ClearOutcome, HistoryBrowser, HistoryLimit};
use crate::identity::IdentityStore;
use crate::remote::{AssistService, HistoryService, HttpRemote};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelTab {
    #[default]
    Assist,
    History,
}

// ── Status ──────────────────────────────────────────────────────────

/// In-flight flags a UI reads to disable the triggering controls.
#[derive(Debug, Clone, Default)]
pub struct PanelStatus {
    assist: Arc<AtomicBool>,
    history: Arc<AtomicBool>,
}

impl PanelStatus {
    pub fn assist_in_flight(&self) -> bool {
        self.assist.load(Ordering::Acquire)
    }

    pub fn history_in_flight(&self) -> bool {
        self.history.load(Ordering::Acquire)
    }
}

/// Sets a flag for its lifetime.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn hold(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self(Arc::clone(flag))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ── Panel ───────────────────────────────────────────────────────────

/// Collaborators the panel drives.
pub struct PanelServices {
    pub surface: Arc<dyn DocumentSurface>,
    pub assist: Arc<dyn AssistService>,
    pub history: Arc<dyn HistoryService>,
}

pub struct AssistPanel {
    client_id: ClientId,
    mode: Mode,
    instruction: String,
    tab: PanelTab,
    resolver: ContextResolver,
    orchestrator: AssistOrchestrator,
    history: HistoryBrowser,
    errors: ErrorSurface,
    status: PanelStatus,
    refresh_history_after_assist: bool,
}

impl AssistPanel {
    pub fn new(
        services: PanelServices,
        identity: &dyn IdentityStore,
        config: &PanelConfig,
    ) -> Result<Self, PanelError> {
        let client_id = identity.get_or_create_client_id()?;
        let orchestrator = AssistOrchestrator::new(services.surface, services.assist)
            .with_explain_heading(config.explain_heading.clone());
        let history = HistoryBrowser::new(
            services.history,
            config.history.limit(),
            config.history.clear_confirm(),
        );

        Ok(Self {
            client_id,
            mode: Mode::default(),
            instruction: String::new(),
            tab: PanelTab::default(),
            resolver: ContextResolver::default(),
            orchestrator,
            history,
            errors: ErrorSurface::default(),
            status: PanelStatus::default(),
            refresh_history_after_assist: config.refresh_history_after_assist,
        })
    }

    /// Panel talking to the configured service over HTTP.
    pub fn connect(
        surface: Arc<dyn DocumentSurface>,
        identity: &dyn IdentityStore,
        config: &PanelConfig,
    ) -> Result<Self, PanelError> {
        let remote = Arc::new(HttpRemote::new(&config.service_url, config.request_timeout())?);
        info!(service_url = %remote.base_url(), "connecting panel");
        let services = PanelServices { surface, assist: remote.clone(), history: remote };
        Self::new(services, identity, config)
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn tab(&self) -> PanelTab {
        self.tab
    }

    pub fn working_context(&self) -> Option<&str> {
        self.resolver.working_context()
    }

    pub fn history(&self) -> &HistoryBrowser {
        &self.history
    }

    pub fn last_error(&self) -> Option<&SurfacedError> {
        self.errors.current()
    }

    pub fn status(&self) -> PanelStatus {
        self.status.clone()
    }

    pub fn can_undo(&self) -> bool {
        self.orchestrator.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.orchestrator.can_redo()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.errors.clear();
        self.mode = mode;
    }

    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.errors.clear();
        self.instruction = instruction.into();
    }

    // ── Context ──

    /// Capture the live selection as the working context.
    pub async fn use_selection(&mut self) -> Result<usize, PanelError> {
        self.errors.clear();
        let result = self.resolver.capture(self.orchestrator.surface().as_ref()).await;
        self.finish("use_selection", result)
    }

    pub fn clear_context(&mut self) {
        self.errors.clear();
        self.resolver.clear();
    }

    // ── Assist ──

    /// Run the current mode and instruction against the document.
    pub async fn run_assist(&mut self) -> Result<AssistOutcome, PanelError> {
        self.errors.clear();
        let result = self.run_assist_inner().await;
        self.finish("run_assist", result)
    }

    async fn run_assist_inner(&mut self) -> Result<AssistOutcome, PanelError> {
        let outcome = {
            let _busy = BusyGuard::hold(&self.status.assist);
            self.orchestrator
                .run(&self.client_id, self.mode, &self.instruction, &self.resolver)
                .await?
        };

        if self.tab == PanelTab::History && self.refresh_history_after_assist {
            let _busy = BusyGuard::hold(&self.status.history);
            if let Err(error) = self.history.load(&self.client_id).await {
                return Err(PanelError::PartialApplication {
                    detail: format!("the history list could not be refreshed: {error}"),
                });
            }
        }
        Ok(outcome)
    }

    /// Restore the document from before the last assist run.
    pub async fn undo(&mut self) -> Result<bool, PanelError> {
        self.errors.clear();
        let result = {
            let _busy = BusyGuard::hold(&self.status.assist);
            self.orchestrator.undo().await
        };
        self.finish("undo", result)
    }

    /// Re-apply the last assist run after an undo.
    pub async fn redo(&mut self) -> Result<bool, PanelError> {
        self.errors.clear();
        let result = {
            let _busy = BusyGuard::hold(&self.status.assist);
            self.orchestrator.redo().await
        };
        self.finish("redo", result)
    }

    /// Append `text` as a new paragraph at the end of the document.
    pub async fn insert_text(&mut self, text: &str) -> Result<(), PanelError> {
        self.errors.clear();
        let result = self
            .orchestrator
            .surface()
            .insert_paragraph_at_end(text)
            .await
            .map_err(PanelError::from);
        self.finish("insert_text", result)
    }

    /// Ping the assist service.
    pub async fn check_connection(&mut self) -> Result<String, PanelError> {
        self.errors.clear();
        let result = self.orchestrator.service().ping().await.map_err(PanelError::from);
        self.finish("check_connection", result)
    }

    // ── History ──

    /// Switch tabs. Opening History loads the current page.
    pub async fn open_tab(&mut self, tab: PanelTab) -> Result<(), PanelError> {
        self.errors.clear();
        self.tab = tab;
        match tab {
            PanelTab::Assist => Ok(()),
            PanelTab::History => self.load_history().await.map(|_| ()),
        }
    }

    pub async fn load_history(&mut self) -> Result<usize, PanelError> {
        self.errors.clear();
        let result = {
            let _busy = BusyGuard::hold(&self.status.history);
            self.history.load(&self.client_id).await.map_err(PanelError::from)
        };
        self.finish("load_history", result)
    }

    pub async fn set_history_limit(&mut self, limit: HistoryLimit) -> Result<usize, PanelError> {
        self.errors.clear();
        let result = {
            let _busy = BusyGuard::hold(&self.status.history);
            self.history.set_limit(&self.client_id, limit).await.map_err(PanelError::from)
        };
        self.finish("set_history_limit", result)
    }

    pub fn select_history_entry(&mut self, id: i64) -> bool {
        self.errors.clear();
        self.history.select(id)
    }

    /// First call arms, a second call within the window clears.
    pub async fn request_clear_history(&mut self) -> Result<ClearOutcome, PanelError> {
        self.errors.clear();
        let result = {
            let _busy = BusyGuard::hold(&self.status.history);
            self.history.request_clear(&self.client_id).await.map_err(PanelError::from)
        };
        self.finish("request_clear_history", result)
    }

    fn finish<T>(&mut self, action: &str, result: Result<T, PanelError>) -> Result<T, PanelError> {
        if let Err(error) = &result {
            warn!(action, kind = ?error.kind(), %error, "panel action failed");
            self.errors.record(error);
        }
        result
    }
}
