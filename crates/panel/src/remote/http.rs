use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;
use wordassist_common::protocol::assist::{AssistRequest, AssistResponse};
use wordassist_common::protocol::endpoints::{ASSIST, HISTORY, PING};
use wordassist_common::protocol::history::{
    ClearHistoryQuery, ClearHistoryResponse, HistoryQuery,
};
use wordassist_common::types::{ActionLogEntry, ClientId};

use super::{AssistService, HistoryService};
use crate::error::RemoteError;
use crate::BoxFuture;

const MAX_ERROR_BODY_BYTES: usize = 4 * 1024;

/// reqwest client for the assist service's REST API.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: Url,
}

impl HttpRemote {
    /// `timeout` of `None` keeps reqwest's default (no overall timeout).
    pub fn new(service_url: &str, timeout: Option<Duration>) -> Result<Self, RemoteError> {
        let base_url = parse_service_url(service_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|error| RemoteError::Transport(error.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|error| RemoteError::InvalidUrl(format!("{path}: {error}")))
    }
}

/// Parse the configured base URL. Only http(s) is accepted, and the path is
/// forced to end in `/` so endpoint paths append to it.
pub fn parse_service_url(raw: &str) -> Result<Url, RemoteError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|error| RemoteError::InvalidUrl(format!("{raw}: {error}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(RemoteError::InvalidUrl(format!("{raw}: unsupported scheme `{other}`")))
        }
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn transport(error: reqwest::Error) -> RemoteError {
    RemoteError::Transport(error.to_string())
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY_BYTES {
        let mut cut = MAX_ERROR_BODY_BYTES;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

/// Turn a non-2xx response into `RemoteError::Status` carrying its body.
async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // Best effort: an unreadable body still yields the status.
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "remote service returned an error status");
    Err(RemoteError::Status { status: status.as_u16(), body: truncate_body(body) })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    ensure_success(response)
        .await?
        .json::<T>()
        .await
        .map_err(|error| RemoteError::Decode(error.to_string()))
}

impl AssistService for HttpRemote {
    fn assist<'a>(
        &'a self,
        request: &'a AssistRequest,
    ) -> BoxFuture<'a, Result<AssistResponse, RemoteError>> {
        Box::pin(async move {
            let url = self.endpoint(ASSIST)?;
            debug!(%url, mode = %request.mode, "sending assist request");
            let response =
                self.client.post(url).json(request).send().await.map_err(transport)?;
            decode_json(response).await
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<String, RemoteError>> {
        Box::pin(async move {
            let url = self.endpoint(PING)?;
            let response = self.client.get(url).send().await.map_err(transport)?;
            ensure_success(response).await?.text().await.map_err(transport)
        })
    }
}

impl HistoryService for HttpRemote {
    fn list<'a>(
        &'a self,
        client_id: &'a ClientId,
        limit: u32,
    ) -> BoxFuture<'a, Result<Vec<ActionLogEntry>, RemoteError>> {
        Box::pin(async move {
            let url = self.endpoint(HISTORY)?;
            let query = HistoryQuery { client_id: client_id.clone(), limit };
            let response =
                self.client.get(url).query(&query).send().await.map_err(transport)?;
            decode_json(response).await
        })
    }

    fn clear<'a>(&'a self, client_id: &'a ClientId) -> BoxFuture<'a, Result<u64, RemoteError>> {
        Box::pin(async move {
            let url = self.endpoint(HISTORY)?;
            let query = ClearHistoryQuery { client_id: client_id.clone() };
            let response =
                self.client.delete(url).query(&query).send().await.map_err(transport)?;
            decode_json::<ClearHistoryResponse>(response).await.map(|reply| reply.deleted)
        })
    }
}
