//! # Application Configuration
//!
//! Typed configuration loaded from environment variables at startup.
//! Missing required credentials (`DATABASE_URL`, `DEEPSEEK_API_KEY`) are a
//! startup error — the process refuses to start rather than limping along
//! without persistence or scoring.

use thiserror::Error;

use esglens_deepseek::{ConfigError as DeepSeekConfigError, DeepSeekConfig};

const ENV_PORT: &str = "PORT";
const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_AUTH_SECRET: &str = "AUTH_TOKEN_SECRET";

const DEFAULT_PORT: u16 = 3001;

/// Startup configuration errors. All of these are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("invalid PORT value: {0}")]
    InvalidPort(String),

    #[error(transparent)]
    DeepSeek(#[from] DeepSeekConfigError),
}

/// Application settings.
#[derive(Clone)]
pub struct AppConfig {
    /// TCP port the HTTP server binds.
    pub port: u16,
    /// Postgres connection string.
    pub database_url: String,
    /// DeepSeek API connection settings.
    pub deepseek: DeepSeekConfig,
    /// Secret for signing auth tokens. `None` means an ephemeral
    /// per-process secret is generated — issued tokens die with the
    /// process.
    pub auth_secret: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The connection string and auth secret are credentials.
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("deepseek", &self.deepseek)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load configuration from the environment, failing fast on missing
    /// required credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var(ENV_PORT) {
            Err(_) => DEFAULT_PORT,
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
        };

        let database_url = std::env::var(ENV_DATABASE_URL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let deepseek = DeepSeekConfig::from_env()?;

        let auth_secret = std::env::var(ENV_AUTH_SECRET)
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Self {
            port,
            database_url,
            deepseek,
            auth_secret,
        })
    }
}
