// History browser: a page of the remote action log for this client, the
// selected entry, and the two-step "clear all" confirmation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use wordassist_common::protocol::history::HISTORY_LIMITS;
use wordassist_common::types::{ActionLogEntry, ClientId};

use crate::error::RemoteError;
use crate::remote::HistoryService;

/// Default confirmation window for clearing history.
pub const DEFAULT_CLEAR_CONFIRM_SECS: u64 = 4;
const MIN_CLEAR_CONFIRM_SECS: u64 = 1;
const MAX_CLEAR_CONFIRM_SECS: u64 = 30;

// ── Limit ───────────────────────────────────────────────────────────

/// Page size for a history read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HistoryLimit {
    #[default]
    Ten,
    Thirty,
    Fifty,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("history limit must be one of 10, 30 or 50 (got {0})")]
pub struct InvalidHistoryLimit(pub u32);

impl HistoryLimit {
    pub const ALL: [HistoryLimit; 3] = [Self::Ten, Self::Thirty, Self::Fifty];

    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Ten => HISTORY_LIMITS[0],
            Self::Thirty => HISTORY_LIMITS[1],
            Self::Fifty => HISTORY_LIMITS[2],
        }
    }
}

impl TryFrom<u32> for HistoryLimit {
    type Error = InvalidHistoryLimit;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|limit| limit.as_u32() == value)
            .ok_or(InvalidHistoryLimit(value))
    }
}

impl fmt::Display for HistoryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

// ── Clear confirmation ──────────────────────────────────────────────

/// Timed arm/confirm gate. The first press arms it until a deadline; a
/// second press before the deadline confirms. Once the deadline passes the
/// gate is disarmed again without anyone having to poll it.
#[derive(Debug, Clone)]
pub struct ClearConfirm {
    window: Duration,
    armed_until: Option<Instant>,
}

/// What a press of the clear control did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmStep {
    Armed { until: Instant },
    Confirmed,
}

impl Default for ClearConfirm {
    fn default() -> Self {
        Self::with_secs(DEFAULT_CLEAR_CONFIRM_SECS)
    }
}

impl ClearConfirm {
    /// Window in whole seconds, clamped to [1, 30].
    pub fn with_secs(secs: u64) -> Self {
        let secs = secs.clamp(MIN_CLEAR_CONFIRM_SECS, MAX_CLEAR_CONFIRM_SECS);
        Self { window: Duration::from_secs(secs), armed_until: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_armed(&self) -> bool {
        self.is_armed_at(Instant::now())
    }

    fn is_armed_at(&self, now: Instant) -> bool {
        self.armed_until.is_some_and(|deadline| now < deadline)
    }

    pub fn press(&mut self) -> ConfirmStep {
        self.press_at(Instant::now())
    }

    fn press_at(&mut self, now: Instant) -> ConfirmStep {
        if self.is_armed_at(now) {
            self.armed_until = None;
            ConfirmStep::Confirmed
        } else {
            let until = now + self.window;
            self.armed_until = Some(until);
            ConfirmStep::Armed { until }
        }
    }

    pub fn disarm(&mut self) {
        self.armed_until = None;
    }
}

// ── Browser ─────────────────────────────────────────────────────────

/// Outcome of a clear request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Nothing deleted yet; press again before `until` to confirm.
    Armed { until: Instant },
    Cleared { deleted: u64 },
}

pub struct HistoryBrowser {
    service: Arc<dyn HistoryService>,
    entries: Vec<ActionLogEntry>,
    selected: Option<i64>,
    limit: HistoryLimit,
    confirm: ClearConfirm,
}

impl HistoryBrowser {
    pub fn new(
        service: Arc<dyn HistoryService>,
        limit: HistoryLimit,
        confirm: ClearConfirm,
    ) -> Self {
        Self { service, entries: Vec::new(), selected: None, limit, confirm }
    }

    /// Newest first, as returned by the service.
    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }

    pub fn limit(&self) -> HistoryLimit {
        self.limit
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&ActionLogEntry> {
        let id = self.selected?;
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn is_clear_armed(&self) -> bool {
        self.confirm.is_armed()
    }

    /// Replace the list with the newest `limit` entries and select the first.
    /// On failure the previous list is kept.
    pub async fn load(&mut self, client_id: &ClientId) -> Result<usize, RemoteError> {
        let limit = self.limit.as_u32();
        let mut entries = self.service.list(client_id, limit).await.inspect_err(|error| {
            warn!(%error, limit, "history load failed");
        })?;
        entries.truncate(limit as usize);

        self.selected = entries.first().map(|entry| entry.id);
        self.entries = entries;
        debug!(count = self.entries.len(), limit, "history loaded");
        Ok(self.entries.len())
    }

    /// Change the page size and reload immediately.
    pub async fn set_limit(
        &mut self,
        client_id: &ClientId,
        limit: HistoryLimit,
    ) -> Result<usize, RemoteError> {
        self.limit = limit;
        self.load(client_id).await
    }

    /// Select an entry by id. Returns false for ids not in the current list.
    pub fn select(&mut self, id: i64) -> bool {
        if self.entries.iter().any(|entry| entry.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    /// First call arms the confirmation; a second call inside the window
    /// deletes every entry owned by `client_id` and reloads.
    pub async fn request_clear(
        &mut self,
        client_id: &ClientId,
    ) -> Result<ClearOutcome, RemoteError> {
        self.request_clear_at(client_id, Instant::now()).await
    }

    async fn request_clear_at(
        &mut self,
        client_id: &ClientId,
        now: Instant,
    ) -> Result<ClearOutcome, RemoteError> {
        if let ConfirmStep::Armed { until } = self.confirm.press_at(now) {
            debug!("history clear armed");
            return Ok(ClearOutcome::Armed { until });
        }

        self.entries.clear();
        self.selected = None;

        let deleted = self.service.clear(client_id).await;
        // Reload even when the delete failed so the list matches the server.
        let reloaded = self.load(client_id).await;

        let deleted = deleted.inspect_err(|error| warn!(%error, "history clear failed"))?;
        reloaded?;
        info!(deleted, "history cleared");
        Ok(ClearOutcome::Cleared { deleted })
    }
}
