//! Generation service abstraction: one opaque remote call, prompt in,
//! text out.
//!
//! Unlike embedding, generation is deliberately not retried here —
//! retries are a deployment-level concern. A failed or malformed response
//! surfaces as an error for the caller to report.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::GenerationConfig;

/// A text generation service.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier used in logs and failure context.
    fn model_name(&self) -> &str;
    /// Generate a completion for `prompt`. Single call, no internal state.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI-compatible `POST <base_url>/chat/completions` client. Works
/// against OpenAI itself or any local server speaking the same protocol.
/// Requires the `OPENAI_API_KEY` environment variable.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [ChatMessage { role: "user", content: prompt }],
            "temperature": 0.3,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("Generation request failed")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to read generation response")?;
        if !status.is_success() {
            anyhow::bail!("Generation API error {}: {}", status, text);
        }

        let json: serde_json::Value =
            serde_json::from_str(&text).context("Failed to parse generation response JSON")?;
        let content = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .ok_or_else(|| anyhow!("Generation response missing choices[0].message.content"))?;

        Ok(content.to_string())
    }
}

/// Create the generator for the configuration.
pub fn create_generator(config: &GenerationConfig) -> Result<Box<dyn Generator>> {
    Ok(Box::new(OpenAiGenerator::new(config)?))
}
