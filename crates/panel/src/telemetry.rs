// tracing subscriber setup for hosts embedding the panel.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when set and valid, else `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install the global fmt subscriber. Fails instead of panicking when a
/// subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .try_init()
        .map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}
