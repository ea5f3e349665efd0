mod api;
mod config;
mod db;
mod errors;
mod evaluation;
mod models;
mod state;

use crate::config::Config;
use crate::errors::ApiError;
use crate::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    // Local state lives under the data dir (ignored by git).
    std::fs::create_dir_all(&config.data_dir).map_err(|_| ApiError::Internal)?;

    let db = db::connect(&config.db_url()).await?;
    db::init_schema(&db).await?;

    let addr = config.addr.clone();
    let state = AppState::new(db, config);

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|_| ApiError::Internal)?;

    tracing::info!(%addr, "backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|_| ApiError::Internal)?;

    Ok(())
}
