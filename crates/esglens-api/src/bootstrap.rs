//! # Startup Wiring
//!
//! Loads configuration, connects the database (running migrations),
//! builds the DeepSeek client, and serves the router. Configuration
//! errors abort startup — there is no degraded mode without a database
//! or an API key.

use std::sync::Arc;

use thiserror::Error;

use esglens_deepseek::{DeepSeekError, HttpChatClient};

use crate::auth::TokenSigner;
use crate::config::{AppConfig, ConfigError};
use crate::state::AppState;

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    DeepSeek(#[from] DeepSeekError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the API server until shutdown.
pub async fn run() -> Result<(), BootstrapError> {
    let config = AppConfig::from_env()?;

    let pool = crate::db::init_pool(&config.database_url).await?;
    let chat = HttpChatClient::new(&config.deepseek)?;
    let tokens = TokenSigner::from_secret(config.auth_secret.clone());
    let state = AppState::new(pool, Arc::new(chat), config.deepseek.clone(), tokens);

    let app = crate::app(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "esglens API server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
