//! Shutdown signal handling.

use tokio::signal;
use tracing::{error, info};

/// Resolve when the process is asked to stop (Ctrl+C, SIGTERM or SIGQUIT)
///
/// Returns the name of the signal received. A handler that cannot be
/// installed is logged and never fires.
pub async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        "ctrl+c"
    };

    #[cfg(unix)]
    let sigterm = wait_for(signal::unix::SignalKind::terminate(), "sigterm");
    #[cfg(unix)]
    let sigquit = wait_for(signal::unix::SignalKind::quit(), "sigquit");

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<&'static str>();
    #[cfg(not(unix))]
    let sigquit = std::future::pending::<&'static str>();

    let signal_name = tokio::select! {
        name = ctrl_c => name,
        name = sigterm => name,
        name = sigquit => name,
    };

    info!(signal = signal_name, "Received shutdown signal");
    signal_name
}

#[cfg(unix)]
async fn wait_for(kind: signal::unix::SignalKind, name: &'static str) -> &'static str {
    match signal::unix::signal(kind) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            error!(signal = name, error = %e, "Failed to install signal handler");
            std::future::pending::<()>().await;
        }
    }
    name
}
