// Per-installation client identity.
//
// The id is created once, persisted, and reused for every assist request and
// for scoping history reads and clears.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing::{info, warn};
use wordassist_common::types::ClientId;

use crate::config::global_dir;
use crate::error::IdentityError;
use crate::private_fs::write_private;

pub const CLIENT_ID_FILE: &str = "client_id";

pub trait IdentityStore: Send + Sync {
    /// Return the stored id, generating and persisting one on first use.
    fn get_or_create_client_id(&self) -> Result<ClientId, IdentityError>;
}

// ── File store ──────────────────────────────────────────────────────

/// Stores the id as a single line in an owner-only file.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.wordassist/client_id`, or `None` without a home directory.
    pub fn default_location() -> Option<Self> {
        global_dir().map(|dir| Self::new(dir.join(CLIENT_ID_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing(&self) -> anyhow::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => {
                Err(error).with_context(|| format!("failed to read `{}`", self.path.display()))
            }
        }
    }
}

impl IdentityStore for FileIdentityStore {
    fn get_or_create_client_id(&self) -> Result<ClientId, IdentityError> {
        let existing = self.read_existing().map_err(IdentityError::Storage)?;
        if let Some(raw) = existing.filter(|raw| !raw.trim().is_empty()) {
            match ClientId::parse(&raw) {
                Ok(id) => return Ok(id),
                // History recorded under the old id is no longer reachable.
                Err(error) => {
                    warn!(%error, path = %self.path.display(), "replacing unreadable client id");
                }
            }
        }

        let id = ClientId::generate();
        write_private(&self.path, format!("{id}\n").as_bytes()).map_err(IdentityError::Storage)?;
        info!(path = %self.path.display(), "created client id");
        Ok(id)
    }
}

// ── Memory store ────────────────────────────────────────────────────

/// Process-local store for embedding hosts without a writable home and tests.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    id: Mutex<Option<ClientId>>,
}

impl MemoryIdentityStore {
    /// Start with a fixed id.
    pub fn with_id(raw: &str) -> Result<Self, IdentityError> {
        Ok(Self { id: Mutex::new(Some(ClientId::parse(raw)?)) })
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get_or_create_client_id(&self) -> Result<ClientId, IdentityError> {
        let mut slot = self.id.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(slot.get_or_insert_with(ClientId::generate).clone())
    }
}
