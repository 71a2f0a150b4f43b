use apotik_backoffice::{
    api::{self, AppState, StaticTokenVerifier},
    config::{self, database},
    errors::Result,
    store::{DataKey, DatabaseStore},
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal: env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::load_app_config()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed branches from config on first run
    let seeded = DatabaseStore::new(db.clone())
        .seed_if_empty(DataKey::Apotiks, serde_json::to_value(&app_config.apotiks)?)
        .await?;
    if seeded {
        info!(count = app_config.apotiks.len(), "Seeded apotiks from configuration.");
    }

    // 6. Serve the data API
    let verifier = StaticTokenVerifier::from_config(&app_config.tokens);
    if verifier.is_empty() {
        warn!("No [[tokens]] configured; every request will be rejected.");
    }
    let app = api::router(AppState::new(db, Arc::new(verifier)));

    let listener = tokio::net::TcpListener::bind(&app_config.server.bind)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", app_config.server.bind, e))?;
    info!("Data API listening on {}", app_config.server.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
