//! Tracing setup.
//!
//! The subscriber is installed once at startup with a reloadable filter
//! so the level from the configuration file can be applied after the
//! configuration has been loaded (which itself wants to log).

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

static RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes priority over `default_level` when set. Calling this
/// more than once is harmless, later calls keep the existing subscriber.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let (filter_layer, handle) = reload::Layer::new(filter);
    let _ = RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer())
        .try_init();
}

/// Replaces the active filter with `level` from the loaded configuration.
///
/// A `RUST_LOG` set in the environment keeps priority and the call
/// becomes a no-op.
pub fn apply_logging_level(level: &str) {
    if std::env::var("RUST_LOG").is_ok() {
        return;
    }
    if let Some(handle) = RELOAD_HANDLE.get() {
        let _ = handle.modify(|filter| *filter = EnvFilter::new(level));
    }
}
