//! Application state management

use prism_core::{BriefingPipeline, GatewayClient, PrismConfig};
use std::sync::Arc;

pub type GatewayPipeline = BriefingPipeline<GatewayClient, GatewayClient, GatewayClient>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PrismConfig>,
    pub pipeline: Arc<GatewayPipeline>,
}

impl AppState {
    pub fn new(config: PrismConfig) -> prism_core::Result<Self> {
        let client = GatewayClient::new(&config.gateway, &config.decoder)?;
        let pipeline = BriefingPipeline::new(client.clone(), client.clone(), client)
            .with_policy(config.decoder.policy());
        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        })
    }
}
