//! Shared router state.

use std::sync::Arc;

use crate::{config::GatewayConfig, upstream::UpstreamClient};

/// Immutable configuration plus the pooled upstream client.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Build the state once at startup.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let upstream = UpstreamClient::new(config.upstream_base.clone(), config.upstream_timeout);
        Self {
            config: Arc::new(config),
            upstream,
        }
    }
}
