// [apps/coordinator/src/main.rs]
//! Process entry point: load environment configuration, bring up the
//! per-component engines behind [`AppState`], and serve the `/api/v1`
//! tree (spec.md §6) until the process is asked to shut down.

use std::net::SocketAddr;

use whistlechain_coordinator::prelude::*;
use whistlechain_telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("whistlechain_coordinator");

    let config = Config::from_env();
    let port = config.port;
    let state = AppState::new(config);
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "coordinator listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Waits for `SIGINT`/`SIGTERM` so in-flight requests can finish before
/// the process exits (spec.md §5 — cancellation must never leave a
/// table in a torn state; a clean shutdown is the simplest way to
/// uphold that at the process level).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining in-flight requests");
}
