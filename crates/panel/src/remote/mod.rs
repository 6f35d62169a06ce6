// Remote assist and history services.
//
// The panel talks to both through traits; `HttpRemote` is the production
// implementation and tests inject in-memory doubles.

pub mod http;

use wordassist_common::protocol::assist::{AssistRequest, AssistResponse};
use wordassist_common::types::{ActionLogEntry, ClientId};

use crate::error::RemoteError;
use crate::BoxFuture;

pub use http::HttpRemote;

pub trait AssistService: Send + Sync {
    /// Send one assist request. The service logs the call on its side.
    fn assist<'a>(
        &'a self,
        request: &'a AssistRequest,
    ) -> BoxFuture<'a, Result<AssistResponse, RemoteError>>;

    /// Liveness probe; returns the service's reply text.
    fn ping(&self) -> BoxFuture<'_, Result<String, RemoteError>>;
}

pub trait HistoryService: Send + Sync {
    /// Newest-first log entries for `client_id`, at most `limit` of them.
    fn list<'a>(
        &'a self,
        client_id: &'a ClientId,
        limit: u32,
    ) -> BoxFuture<'a, Result<Vec<ActionLogEntry>, RemoteError>>;

    /// Delete every entry owned by `client_id`; returns the number removed.
    fn clear<'a>(&'a self, client_id: &'a ClientId) -> BoxFuture<'a, Result<u64, RemoteError>>;
}
