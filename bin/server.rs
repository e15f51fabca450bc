// Expense Tracker - Web Server
// Serves the JSON API over the local expense store

use anyhow::{Context, Result};
use expense_tracker::api::{router, AppState};
use expense_tracker::{init_logging, open_store, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("info");

    let config = Config::from_env();
    info!("Opening expense store at {:?}", config.db_path);
    let store = open_store(&config)?;
    info!("Loaded {} expenses", store.len());

    let app = router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server_addr))?;

    info!("🚀 Server running on http://{}", config.server_addr);
    info!("   API: http://{}/api/expenses", config.server_addr);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
