use anyhow::Result;
use common::{VcmsClient, VcmsConfig};
use detail::{UserMediaSubscription, ViewContext};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod registry;
mod routes;
mod state;

use registry::DetailRegistry;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting dashboard service");

    let config = VcmsConfig::from_env()?;
    info!("Using VCMS backend at {}", config.base_url);

    let client = Arc::new(VcmsClient::new(&config)?);

    let registry = DetailRegistry::new(
        client.clone(),
        config.detail_poll_interval(),
        ViewContext::from_config(&config),
    );
    let reaper = registry.spawn_reaper(config.subscription_idle(), config.subscription_idle());

    let user_media = UserMediaSubscription::start(
        client.clone(),
        client.clone(),
        config.list_poll_interval(),
    );

    let app_state = AppState {
        registry,
        user_media: Arc::new(user_media),
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Dashboard service listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.abort();
    info!("Shutting down dashboard service");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
