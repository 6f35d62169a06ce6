// Bodies for the history endpoints (`GET`/`DELETE /api/history`).

use serde::{Deserialize, Serialize};

use crate::types::ClientId;

/// Page sizes the service accepts for a history read.
pub const HISTORY_LIMITS: &[u32] = &[10, 30, 50];

/// Query string for a history read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub client_id: ClientId,
    pub limit: u32,
}

/// Query string for a history clear.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClearHistoryQuery {
    pub client_id: ClientId,
}

/// Reply to a history clear: the number of rows removed for the identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClearHistoryResponse {
    pub deleted: u64,
}
