//! OS signal handling.
//!
//! - SIGINT / SIGTERM: graceful shutdown
//! - SIGHUP: reload the header policy from its backend, not shutdown

use std::sync::Arc;

use crate::policy::PolicyStore;

/// Resolve when Ctrl+C or (on unix) SIGTERM arrives.
pub async fn wait_for_terminate() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Reload `store` every time SIGHUP arrives.
#[cfg(unix)]
pub fn reload_on_hangup(store: Arc<PolicyStore>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(sig) => sig,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGHUP handler");
            return;
        }
    };

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            tracing::info!("Received SIGHUP, reloading header policy");
            let store = store.clone();
            match tokio::task::spawn_blocking(move || store.reload()).await {
                Ok(Ok(changed)) => tracing::info!(changed, "Header policy reload finished"),
                Ok(Err(e)) => tracing::error!(error = %e, "Reload failed, keeping current policy"),
                Err(e) => tracing::error!(error = %e, "Reload task failed"),
            }
        }
    });
}

#[cfg(not(unix))]
pub fn reload_on_hangup(_store: Arc<PolicyStore>) {}
