use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::config::ApiConfig;
use web::{AppState, config::WebConfig, create_router, jwt::JwtConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting web service");

    let config = WebConfig::from_env()?;
    let jwt_config = JwtConfig::from_env()?;
    let api_config = ApiConfig::from_env()?;

    let bind_address = config.bind_address.clone();
    let app_state = AppState::new(config, jwt_config, &api_config)?;

    info!("Web service initialized successfully");

    // Start the web server
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Web service listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
