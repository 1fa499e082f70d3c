//! # esglens-deepseek — DeepSeek Client & LLM-Backed Evaluators
//!
//! HTTP client for the DeepSeek chat-completions API (OpenAI-compatible
//! wire format) and the two LLM-backed pipelines built on it:
//!
//! - [`analysis`] — ESG text analysis: entity extraction, dimension
//!   scoring, insights, and risks, with a keyword estimator for
//!   unparseable responses and a fixed local analysis when the call
//!   itself fails. Never errors.
//! - [`compliance`] — the LLM half of the two-tier compliance pipeline.
//!   Any transport or parse failure delegates the full rule set to the
//!   deterministic evaluator in `esglens-rules`; partial LLM results are
//!   never mixed with fallback results.
//!
//! The client is injected through the [`chat::ChatClient`] trait so both
//! pipelines can be driven by a test double; the production
//! [`chat::HttpChatClient`] applies the configured per-request timeout
//! and retries transport failures with exponential backoff.

pub mod analysis;
pub mod chat;
pub mod compliance;
pub mod config;
pub mod error;
mod retry;

pub use chat::{ChatClient, ChatMessage, ChatOptions, HttpChatClient};
pub use config::{ConfigError, DeepSeekConfig};
pub use error::DeepSeekError;
