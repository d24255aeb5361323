use tracing_subscriber::EnvFilter;

use zoo_admin::config;
use zoo_admin::server::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up REMOTE_*_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let default_level = if zoo_admin::is_development!() { "zoo_admin=debug,tower_http=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = config::config();
    tracing::info!("Starting Zoo Admin in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("SECURITY_JWT_SECRET is not set; every session will be anonymous");
    }

    let state = AppState::from_config(config)?;
    let app = app(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Zoo Admin listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
