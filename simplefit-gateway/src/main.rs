//! Entry point for the `simplefit-gateway` HTTP server.

use simplefit_gateway::{config::GatewayConfig, routes::create_router, state::AppState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        upstream = %config.upstream_base,
        timeout_secs = config.upstream_timeout.as_secs(),
        allowed_origins = config.allowed_origins.len(),
        identity_provider = config.identity_provider.is_some(),
        "configuration loaded"
    );

    let addr = config.listen_addr.clone();
    let app = create_router(AppState::new(config));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "simplefit-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
