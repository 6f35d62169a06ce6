// wordassist-panel: client-side core of the Word Assistant side panel.
//
// Owns the mode state machine, context resolution, the assist request cycle,
// the single-step undo/redo snapshots and the history browser. The host
// document and the remote services sit behind traits so the core runs
// against real hosts and in-memory doubles alike.

use std::future::Future;
use std::pin::Pin;

pub mod assist;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod history;
pub mod identity;
pub mod panel;
mod private_fs;
pub mod remote;
pub mod snapshot;
pub mod telemetry;

pub use wordassist_common::types::{ActionLogEntry, ClientId, Mode, Scope};

/// Boxed future returned by the host and service seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
