//! Binds and serves the built router until a shutdown signal arrives
//! (spec §6 "graceful shutdown").

use crate::http::build_router;
use crate::state::AppState;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Binds `addr`, serves the router built from `state`, and returns once
/// a shutdown signal (Ctrl+C, or on Unix, `SIGTERM`) has been handled.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "ragate listening");
    axum::serve(listener, build_router(state)).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("ragate shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
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
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
