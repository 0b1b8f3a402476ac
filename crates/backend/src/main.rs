use backend::api::ImportServices;
use backend::routes::configure_routes;
use backend::shared::config;
use backend::system;
use backend::system::tasks::SessionCleanupWorker;
use tokio::net::TcpListener;

/// Период очистки устаревших сессий импорта
const CLEANUP_INTERVAL_SECS: u64 = 600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = config::load_config()?;
    let services = ImportServices::from_config(&config)?;

    let cleanup = SessionCleanupWorker::new(services.clone(), CLEANUP_INTERVAL_SECS);
    tokio::spawn(async move { cleanup.run_loop().await });

    let app = configure_routes(&services, config.import.max_upload_bytes);

    let addr = config.listen_addr();
    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: {} is already in use. Please ensure no other process is using this port.",
                    addr
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
