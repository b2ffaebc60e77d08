use relay_common::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "list_relay=info,relay_app=info,relay_poller=info,relay_notifier=info,relay_engine=info"
                    .into()
            }),
        )
        .json()
        .init();

    tracing::info!("ListRelay starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    let relay = match relay_app::start(&config).await {
        Ok(relay) => relay,
        Err(e) => {
            tracing::error!("Startup failed: {e:#}");
            return Err(e);
        }
    };

    tracing::info!(list_id = config.list_id, "ListRelay running");

    shutdown_signal().await;
    tracing::info!("Received shutdown signal, stopping gracefully...");

    relay.shutdown();
    let stats = relay.join().await?;

    tracing::info!(
        delivered = stats.delivered,
        failed = stats.failed,
        "ListRelay stopped."
    );
    Ok(())
}

/// Resolve on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
