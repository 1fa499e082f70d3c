//! # Chat-Completions Client
//!
//! Minimal client for the DeepSeek chat-completions endpoint (OpenAI-
//! compatible wire format). The [`ChatClient`] trait is the seam between
//! the evaluators and the transport: production code injects
//! [`HttpChatClient`], tests inject a scripted double.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{DeepSeekConfig, DEEPSEEK_CHAT_MODEL};
use crate::error::DeepSeekError;
use crate::retry::retry_send;

/// A single chat message in a completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Per-call generation and transport bounds.
///
/// Generation is non-deterministic at low temperature with a hard cap on
/// response length; streaming is never used. The timeout and retry count
/// bound the transport so a slow upstream surfaces as a call failure, not
/// an unbounded hang.
#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_retries: u32,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

/// Transport seam for chat completions. Returns the assistant message
/// content of the first choice.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<String, DeepSeekError>;
}

/// Production [`ChatClient`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    client: reqwest::Client,
    base_url: String,
    model: &'static str,
}

impl HttpChatClient {
    /// Build a client from configuration. The API key becomes a default
    /// `Authorization: Bearer` header; per-request timeouts come from
    /// [`ChatOptions`] so compliance calls can wait longer than analysis
    /// calls on the same client.
    pub fn new(config: &DeepSeekConfig) -> Result<Self, DeepSeekError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth =
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(
                |_| DeepSeekError::Config(crate::config::ConfigError::MissingApiKey),
            )?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DeepSeekError::Http {
                endpoint: config.base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: DEEPSEEK_CHAT_MODEL,
        })
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<String, DeepSeekError> {
        let endpoint = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: self.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: false,
        };

        let response = retry_send(options.max_retries, || {
            self.client
                .post(&endpoint)
                .timeout(options.timeout)
                .json(&request)
                .send()
        })
        .await
        .map_err(|e| DeepSeekError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeepSeekError::Api {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| DeepSeekError::MalformedResponse {
                    endpoint: endpoint.clone(),
                    reason: e.to_string(),
                })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(DeepSeekError::MalformedResponse {
                endpoint,
                reason: "response contained no choices".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_openai_wire_format() {
        let messages = [
            ChatMessage::system("you are an expert"),
            ChatMessage::user("analyse this"),
        ];
        let request = ChatCompletionRequest {
            model: DEEPSEEK_CHAT_MODEL,
            messages: &messages,
            temperature: 0.2,
            max_tokens: 3000,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["stream"], false);
        assert_eq!(json["max_tokens"], 3000);
    }

    #[test]
    fn response_deserializes_first_choice_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{\"rules\":[]}"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, r#"{"rules":[]}"#);
    }
}
