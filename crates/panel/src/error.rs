// Error kinds surfaced by panel actions, plus the single "last error" slot
// the UI renders.

use thiserror::Error;
use wordassist_common::types::ClientIdError;

/// Local precondition failures. No network call is made, or an answer that
/// already arrived is discarded without touching the document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("instruction is required")]
    EmptyInstruction,

    #[error("selection required: select text or capture it with \"use selection\" first")]
    SelectionRequired,

    #[error("empty response from the assist service")]
    EmptyResponse,

    #[error("nothing is selected in the document")]
    EmptySelection,
}

/// Failures talking to the assist or history service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("remote service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("remote service unreachable: {0}")]
    Transport(String),

    #[error("unexpected response from remote service: {0}")]
    Decode(String),

    #[error("invalid service URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// HTTP status, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }
}

/// Failures reported by the host document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document host error: {0}")]
    Host(String),

    #[error("document host did not return a value for a queued read")]
    MissingRead,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("client id storage failed: {0:#}")]
    Storage(anyhow::Error),

    #[error("stored client id is invalid: {0}")]
    Invalid(#[from] ClientIdError),
}

/// Umbrella error for every panel action.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The document was mutated but a later step failed.
    #[error("document was updated, but {detail}")]
    PartialApplication { detail: String },

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Remote,
    Document,
    PartialApplication,
    Identity,
}

impl PanelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Remote(_) => ErrorKind::Remote,
            Self::Document(_) => ErrorKind::Document,
            Self::PartialApplication { .. } => ErrorKind::PartialApplication,
            Self::Identity(_) => ErrorKind::Identity,
        }
    }
}

// ── Error surface ───────────────────────────────────────────────────

/// User-visible rendering of the most recent failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfacedError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Holds at most one error: overwritten by any failing action and cleared
/// when the next action starts.
#[derive(Debug, Default)]
pub struct ErrorSurface {
    last: Option<SurfacedError>,
}

impl ErrorSurface {
    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn record(&mut self, error: &PanelError) {
        self.last = Some(SurfacedError { kind: error.kind(), message: error.to_string() });
    }

    pub fn current(&self) -> Option<&SurfacedError> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_status_is_exposed() {
        let error = RemoteError::Status { status: 502, body: "bad gateway".into() };
        assert_eq!(error.status(), Some(502));
        assert_eq!(RemoteError::Transport("refused".into()).status(), None);
        assert_eq!(error.to_string(), "remote service returned HTTP 502: bad gateway");
    }

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            PanelError::from(ValidationError::EmptyInstruction).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            PanelError::from(DocumentError::Host("gone".into())).kind(),
            ErrorKind::Document
        );
        let partial = PanelError::PartialApplication { detail: "history refresh failed".into() };
        assert_eq!(partial.kind(), ErrorKind::PartialApplication);
        assert_eq!(partial.to_string(), "document was updated, but history refresh failed");
    }

    #[test]
    fn surface_keeps_only_the_last_error() {
        let mut surface = ErrorSurface::default();
        assert!(surface.current().is_none());

        surface.record(&ValidationError::EmptyInstruction.into());
        surface.record(&RemoteError::Transport("refused".into()).into());
        let current = surface.current().expect("error should be recorded");
        assert_eq!(current.kind, ErrorKind::Remote);
        assert!(current.message.contains("refused"));

        surface.clear();
        assert!(surface.current().is_none());
    }
}
