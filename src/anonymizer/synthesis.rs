//! LLM-backed value synthesis
//!
//! Optional replacement source for the anonymizer: instead of a fixed
//! literal, each detected span is swapped for a plausible fake value of
//! the same entity type, produced by a chat-completion endpoint. The
//! client is configured entirely from the environment and is absent when
//! no credential is set, so callers can fail fast before touching any
//! text.

use crate::domain::{MosaicError, Result};
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Synthesis backend configuration, sourced from the environment
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl SynthesisConfig {
    /// Read configuration from the environment
    ///
    /// Returns `None` when `OPENAI_API_KEY` is unset or empty; synthesis
    /// is simply unavailable in that case, not an error.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }

        let endpoint = std::env::var("MOSAIC_SYNTHESIS_URL")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = std::env::var("MOSAIC_SYNTHESIS_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("MOSAIC_SYNTHESIS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Some(Self {
            api_key,
            endpoint,
            model,
            timeout_secs,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Client for the synthesis endpoint
pub struct SynthesisClient {
    config: SynthesisConfig,
    client: Client,
}

impl SynthesisClient {
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MosaicError::Synthesis(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Produce a plausible fake value of the same shape as `original`
    pub async fn synthesize(&self, entity_type: &str, original: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": 0.7,
            "messages": [
                {
                    "role": "system",
                    "content": "你是一个数据脱敏助手。用户会给出一条个人信息的类型和原始值，\
                                请生成一个格式相同但完全虚构的替代值。只输出替代值本身，\
                                不要任何解释。"
                },
                {
                    "role": "user",
                    "content": format!("类型：{entity_type}\n原始值：{original}")
                }
            ]
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MosaicError::Synthesis(format!("synthesis request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MosaicError::Synthesis(format!(
                "synthesis endpoint returned {status}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| MosaicError::Synthesis(format!("malformed synthesis response: {e}")))?;

        let value = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                MosaicError::Synthesis("synthesis response contained no completion".to_string())
            })?;

        tracing::debug!(entity_type, "synthesized replacement value");
        Ok(value)
    }
}
