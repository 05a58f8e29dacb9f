use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use wallet_server::config::Config;
use wallet_server::ingest::HttpValidator;
use wallet_server::routes::create_routes;
use wallet_server::{AppState, Store};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wallet_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    let store = Store::open(&config.database_url)
        .await
        .expect("Failed to open wallet database");

    tracing::info!(database = %config.database_url, "Wallet database ready");

    let validator = HttpValidator::new(config.validation_timeout)
        .expect("Failed to build validation endpoint client");

    tracing::info!(
        timeout_secs = config.validation_timeout.as_secs(),
        "Validation endpoint client ready"
    );

    let state = AppState::new(store, Arc::new(validator));
    let app: Router = create_routes(state, &config);

    tracing::info!("Wallet running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
