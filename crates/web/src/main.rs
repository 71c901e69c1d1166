use std::sync::Arc;

use anyhow::Context;
use volunteer_storage::Database;

mod app;
mod config;
mod error;
mod features;
mod middleware;
mod notifier;
mod state;

use config::Config;
use middleware::auth::ApiKeys;
use notifier::TracingNotifier;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting volunteer activity API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!(engine = ?config.engine, "Configuration loaded successfully");

    let db = match &config.seed_file {
        Some(path) => {
            tracing::info!("Loading seed data from: {}", path);
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read seed file {}", path))?;
            Database::from_json(&json, &config.engine).context("Failed to load seed data")?
        }
        None => {
            tracing::info!("No SEED_FILE configured, starting with an empty store");
            Database::new()
        }
    };

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_open() {
        tracing::warn!("API_KEYS is empty, protected routes are open");
    }

    let state = AppState::new(db, config.engine.clone(), Arc::new(TracingNotifier));
    let app = app::build_router(state, api_keys);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
