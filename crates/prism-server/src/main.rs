//! Prism Server - HTTP API for topic briefings and speech decoding

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod error;
mod settings;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prism_server=debug,prism_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Prism server");

    let config = settings::load()?;
    info!("Generation gateway: {}", config.gateway.base_url);
    info!(
        "Speech decoding: {} Hz, {} channel(s), {:?}",
        config.decoder.sample_rate,
        config.decoder.channels,
        config.decoder.policy()
    );

    let addr = config.server.bind_addr();
    let state = AppState::new(config)?;
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
