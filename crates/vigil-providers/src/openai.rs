//! OpenAI-compatible chat-completions provider.

use async_trait::async_trait;
use std::time::Duration;
use vigil_core::config::ContentConfig;
use vigil_core::error::{Result, VigilError};
use vigil_core::traits::TextProvider;

pub struct OpenAiCompatProvider {
    api_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(config: &ContentConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.ai_timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    async fn chat(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "stream": false,
        });

        let mut req = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| VigilError::Http(format!("Provider connection failed ({}): {}", self.api_url, e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(VigilError::Provider(format!("Provider API error {status}: {text}")));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| VigilError::Http(e.to_string()))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| VigilError::Provider("Empty completion".into()))
    }
}

#[async_trait]
impl TextProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        // Hard wall-clock bound: a stuck provider call must not outlive the
        // scheduler tick that triggered it.
        match tokio::time::timeout(self.timeout, self.chat(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Provider timed out after {:?}", self.timeout);
                Err(VigilError::Timeout(format!(
                    "generation exceeded {}s",
                    self.timeout.as_secs()
                )))
            }
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let resp = self.client.get(&self.api_url).send().await;
        Ok(resp.is_ok())
    }
}
