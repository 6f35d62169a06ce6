// Core domain types shared by the panel and the remote service contract.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Operating mode selected in the panel.
///
/// The mode decides which text is sent to the assist service and how the
/// returned text is written back into the document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Replace the current selection with the answer.
    #[default]
    Rewrite,
    /// Insert the answer after the current selection.
    Explain,
    /// Replace the whole document with the answer.
    Document,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Rewrite, Mode::Explain, Mode::Document];

    /// Scope reported to the remote log for this mode.
    pub const fn scope(self) -> Scope {
        match self {
            Self::Rewrite | Self::Explain => Scope::Selection,
            Self::Document => Scope::Document,
        }
    }

    pub const fn action_type(self) -> ActionType {
        match self {
            Self::Rewrite => ActionType::RewriteSelection,
            Self::Explain => ActionType::ExplainSelection,
            Self::Document => ActionType::RewriteDocument,
        }
    }

    /// Only an explanation needs non-empty input; the other modes may
    /// generate text from nothing.
    pub const fn requires_context(self) -> bool {
        matches!(self, Self::Explain)
    }

    /// An empty answer is a legitimate "delete" result except for EXPLAIN.
    pub const fn accepts_empty_answer(self) -> bool {
        !matches!(self, Self::Explain)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rewrite => "REWRITE",
            Self::Explain => "EXPLAIN",
            Self::Document => "DOCUMENT",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of the document an action touches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    Selection,
    Document,
}

/// Action classification recorded in the remote log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    RewriteSelection,
    ExplainSelection,
    RewriteDocument,
    /// Action types written by other clients of the log.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Success,
    Error,
}

// ── Client identity ─────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientIdError {
    #[error("client id is empty")]
    Empty,

    #[error("client id contains whitespace or control characters")]
    InvalidCharacters,
}

/// Opaque per-installation identifier scoping every remote call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept a previously persisted identifier. Surrounding whitespace is
    /// stripped; anything else must be a single printable token.
    pub fn parse(raw: &str) -> Result<Self, ClientIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClientIdError::Empty);
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ClientIdError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Action log ──────────────────────────────────────────────────────

/// One row of the remote append-only action log. Read-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub client_id: ClientId,
    pub scope: Scope,
    pub action_type: ActionType,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub input_text: String,
    #[serde(default)]
    pub output_text: Option<String>,
    pub status: ActionStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ActionLogEntry {
    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_rewrite() {
        assert_eq!(Mode::default(), Mode::Rewrite);
    }

    #[test]
    fn scope_mirrors_mode() {
        assert_eq!(Mode::Rewrite.scope(), Scope::Selection);
        assert_eq!(Mode::Explain.scope(), Scope::Selection);
        assert_eq!(Mode::Document.scope(), Scope::Document);
    }

    #[test]
    fn only_explain_requires_context_and_rejects_empty_answers() {
        for mode in Mode::ALL {
            let is_explain = mode == Mode::Explain;
            assert_eq!(mode.requires_context(), is_explain, "{mode}");
            assert_eq!(mode.accepts_empty_answer(), !is_explain, "{mode}");
        }
    }

    #[test]
    fn mode_serializes_screaming_snake() {
        assert_eq!(serde_json::to_string(&Mode::Document).unwrap(), "\"DOCUMENT\"");
        let mode: Mode = serde_json::from_str("\"EXPLAIN\"").unwrap();
        assert_eq!(mode, Mode::Explain);
    }

    #[test]
    fn unknown_action_type_deserializes_to_unknown() {
        let action: ActionType = serde_json::from_str("\"TRANSLATE\"").unwrap();
        assert_eq!(action, ActionType::Unknown);
    }

    #[test]
    fn generated_client_ids_are_unique_uuids() {
        let a = ClientId::generate();
        let b = ClientId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn client_id_parse_trims_and_validates() {
        assert_eq!(ClientId::parse("  abc-123\n").unwrap().as_str(), "abc-123");
        assert_eq!(ClientId::parse("   "), Err(ClientIdError::Empty));
        assert_eq!(ClientId::parse("a b"), Err(ClientIdError::InvalidCharacters));
    }

    #[test]
    fn client_id_is_transparent_on_the_wire() {
        let id = ClientId::parse("c-1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"c-1\"");
    }
}
