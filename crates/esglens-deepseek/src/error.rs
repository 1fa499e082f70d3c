//! DeepSeek client error types.

/// Errors from DeepSeek chat-completion calls.
///
/// Every variant is recoverable: both evaluators absorb these into their
/// fallback paths rather than surfacing them to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum DeepSeekError {
    /// HTTP transport error (connection failure, timeout).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The API returned a non-2xx status.
    #[error("DeepSeek API {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body did not match the chat-completions shape, or
    /// contained no choices.
    #[error("malformed DeepSeek response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
