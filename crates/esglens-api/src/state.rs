//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use esglens_deepseek::{ChatClient, DeepSeekConfig};

use crate::auth::TokenSigner;

/// State shared across request handlers.
///
/// The connection pool is the only shared mutable resource — there are no
/// in-process caches and no evaluator state across requests. The chat
/// client is injected behind the [`ChatClient`] trait so tests substitute
/// a scripted double.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub chat: Arc<dyn ChatClient>,
    pub deepseek: DeepSeekConfig,
    pub tokens: TokenSigner,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        chat: Arc<dyn ChatClient>,
        deepseek: DeepSeekConfig,
        tokens: TokenSigner,
    ) -> Self {
        Self {
            pool,
            chat,
            deepseek,
            tokens,
        }
    }
}
