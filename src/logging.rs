use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize tracing with a compact stdout layer.
///
/// - Default level: INFO, override via RUST_LOG env
/// - Idempotent: tests and the host app can both call it
pub fn init() {
    if INITIALIZED.set(()).is_err() {
        return;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,contextkit_core=debug"));

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();

    tracing::debug!("Tracing initialized");
}
