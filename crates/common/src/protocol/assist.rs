// Request/response bodies for `POST /api/assist`.

use serde::{Deserialize, Serialize};

use crate::types::{ActionType, ClientId, Mode, Scope};

/// Body sent to the assist endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssistRequest {
    pub client_id: ClientId,
    pub scope: Scope,
    pub action_type: ActionType,
    pub context_text: String,
    pub instruction: String,
    pub mode: Mode,
}

impl AssistRequest {
    /// Build a request whose scope and action type mirror `mode`.
    pub fn new(
        client_id: ClientId,
        mode: Mode,
        context_text: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            client_id,
            scope: mode.scope(),
            action_type: mode.action_type(),
            context_text: context_text.into(),
            instruction: instruction.into(),
            mode,
        }
    }
}

/// Successful assist reply. The service logs every call and returns the id
/// of the log row alongside the answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssistResponse {
    #[serde(default)]
    pub log_id: Option<i64>,
    /// Required. A reply without it is a decode failure, never an empty answer.
    pub answer: String,
}
