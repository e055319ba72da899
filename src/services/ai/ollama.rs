use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{LlmProvider, Message};

pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(url: String, model: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Ollama client")?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            model,
            client,
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let mut chat = vec![json!({ "role": "system", "content": system_prompt })];
        chat.extend(
            messages
                .iter()
                .map(|m| json!({ "role": m.role, "content": m.content })),
        );

        // Classification wants a stable, machine-readable answer.
        let body = json!({
            "model": self.model,
            "messages": chat,
            "stream": false,
            "format": "json",
            "options": { "temperature": 0 },
        });

        let data: serde_json::Value = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&body)
            .send()
            .await
            .context("failed to call Ollama API")?
            .error_for_status()
            .context("Ollama API returned error")?
            .json()
            .await
            .context("failed to parse Ollama response")?;

        data["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing content in Ollama response"))
    }
}
