//! DeepSeek client configuration from environment variables.

use std::time::Duration;

use thiserror::Error;

/// Environment variable names, matching the deployment convention.
const ENV_API_KEY: &str = "DEEPSEEK_API_KEY";
const ENV_BASE_URL: &str = "DEEPSEEK_BASE_URL";
const ENV_TIMEOUT: &str = "DEEPSEEK_TIMEOUT";
const ENV_MAX_RETRIES: &str = "DEEPSEEK_MAX_RETRIES";

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RETRIES: u32 = 2;

/// The chat model used for both analysis and compliance calls.
pub const DEEPSEEK_CHAT_MODEL: &str = "deepseek-chat";

/// Configuration errors. Raised at startup only — the process refuses to
/// start without a usable DeepSeek configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `DEEPSEEK_API_KEY` is unset or empty.
    #[error("DEEPSEEK_API_KEY is not set")]
    MissingApiKey,

    /// A numeric environment variable did not parse.
    #[error("invalid value for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

/// DeepSeek API connection settings.
#[derive(Clone)]
pub struct DeepSeekConfig {
    /// Bearer token for the DeepSeek API.
    pub api_key: String,
    /// API base URL without a trailing slash.
    pub base_url: String,
    /// Per-request timeout for analysis calls.
    pub timeout: Duration,
    /// Transport-level retry attempts after the initial request.
    pub max_retries: u32,
}

impl std::fmt::Debug for DeepSeekConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl DeepSeekConfig {
    /// Load configuration from the environment.
    ///
    /// Fails fast when the API key is missing. `DEEPSEEK_TIMEOUT` is in
    /// milliseconds (default 30000); `DEEPSEEK_MAX_RETRIES` defaults to 2.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = std::env::var(ENV_BASE_URL)
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_ms = parse_env_number(ENV_TIMEOUT, DEFAULT_TIMEOUT_MS)?;
        let max_retries = parse_env_number(ENV_MAX_RETRIES, u64::from(DEFAULT_MAX_RETRIES))? as u32;

        Ok(Self {
            api_key,
            base_url,
            timeout: Duration::from_millis(timeout_ms),
            max_retries,
        })
    }

    /// Construct a configuration directly — used by tests and the CLI.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

fn parse_env_number(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_strips_trailing_slash() {
        let config = DeepSeekConfig::new("sk-test", "https://api.deepseek.com/");
        assert_eq!(config.base_url, "https://api.deepseek.com");
        assert_eq!(config.timeout, Duration::from_millis(30_000));
        assert_eq!(config.max_retries, 2);
    }
}
