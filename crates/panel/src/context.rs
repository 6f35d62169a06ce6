// Context resolution: which text is sent to the assist service.
//
// DOCUMENT mode sends the whole document (possibly empty). REWRITE and
// EXPLAIN send the live selection when there is one, else the captured
// working context, else nothing. EXPLAIN refuses to run without input.

use tracing::debug;
use wordassist_common::types::Mode;

use crate::document::DocumentSurface;
use crate::error::{PanelError, ValidationError};

/// Where the resolved text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSource {
    LiveSelection,
    WorkingContext,
    WholeDocument,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    pub text: String,
    pub source: ContextSource,
}

/// Whitespace-only text counts as no text.
fn has_text(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Selection-scoped resolution. The live selection wins over a captured
/// context because the user may have moved the selection since capturing.
pub fn resolve_selection_context(
    mode: Mode,
    working_context: Option<&str>,
    live_selection: &str,
) -> Result<ResolvedContext, ValidationError> {
    let resolved = if has_text(live_selection) {
        ResolvedContext { text: live_selection.to_string(), source: ContextSource::LiveSelection }
    } else if let Some(working) = working_context.filter(|text| has_text(text)) {
        ResolvedContext { text: working.to_string(), source: ContextSource::WorkingContext }
    } else {
        ResolvedContext { text: String::new(), source: ContextSource::Empty }
    };

    if mode.requires_context() && resolved.source == ContextSource::Empty {
        return Err(ValidationError::SelectionRequired);
    }
    Ok(resolved)
}

/// Owns the working context captured by "use selection".
#[derive(Debug, Default)]
pub struct ContextResolver {
    working_context: Option<String>,
}

impl ContextResolver {
    pub fn working_context(&self) -> Option<&str> {
        self.working_context.as_deref()
    }

    /// Capture the live selection as the working context, replacing any
    /// earlier capture. Returns the captured length in bytes.
    pub async fn capture(&mut self, surface: &dyn DocumentSurface) -> Result<usize, PanelError> {
        let selection = surface.read_selection_text().await?;
        if !has_text(&selection) {
            return Err(ValidationError::EmptySelection.into());
        }
        let len = selection.len();
        self.working_context = Some(selection);
        debug!(len, "captured working context");
        Ok(len)
    }

    pub fn clear(&mut self) {
        self.working_context = None;
    }

    /// Resolve the text to send for `mode`, reading the document only as far
    /// as the mode needs.
    pub async fn resolve(
        &self,
        mode: Mode,
        surface: &dyn DocumentSurface,
    ) -> Result<ResolvedContext, PanelError> {
        let resolved = match mode {
            Mode::Document => ResolvedContext {
                text: surface.read_whole_document_text().await?,
                source: ContextSource::WholeDocument,
            },
            Mode::Rewrite | Mode::Explain => {
                let live = surface.read_selection_text().await?;
                resolve_selection_context(mode, self.working_context(), &live)?
            }
        };
        debug!(%mode, source = ?resolved.source, len = resolved.text.len(), "resolved context");
        Ok(resolved)
    }
}
