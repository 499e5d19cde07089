//! Telegram Bot API dispatcher — REST `sendMessage` only.

use async_trait::async_trait;
use std::time::Duration;
use vigil_core::config::TelegramConfig;
use vigil_core::error::{Result, VigilError};
use vigil_core::traits::Dispatcher;

/// Documented `sendMessage` text ceiling.
pub const TELEGRAM_MAX_BODY_LEN: usize = 4096;

pub struct TelegramDispatcher {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramDispatcher {
    pub fn new(config: &TelegramConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_secs))
            .build()
            .unwrap_or_default();
        Self { bot_token: config.bot_token.clone(), client }
    }
}

/// Map an HTTP status from the Bot API onto the engine's failure taxonomy.
/// 429 and server-side errors are worth a same-window retry; client-side
/// errors (bad chat id, blocked bot) never are.
fn classify_status(status: reqwest::StatusCode, detail: &str) -> VigilError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        VigilError::ChannelTransient(format!("Telegram {status}: {detail}"))
    } else {
        VigilError::ChannelPermanent(format!("Telegram {status}: {detail}"))
    }
}

#[async_trait]
impl Dispatcher for TelegramDispatcher {
    fn name(&self) -> &str {
        "telegram"
    }

    fn max_body_len(&self) -> usize {
        TELEGRAM_MAX_BODY_LEN
    }

    async fn send(&self, address: &str, body: &str) -> Result<()> {
        // Length validation belongs to the content side; an oversized body
        // reaching this point is rejected, never silently truncated.
        if body.chars().count() > TELEGRAM_MAX_BODY_LEN {
            return Err(VigilError::permanent(format!(
                "body exceeds channel limit ({} > {TELEGRAM_MAX_BODY_LEN} chars)",
                body.chars().count()
            )));
        }
        if address.is_empty() {
            return Err(VigilError::permanent("empty recipient address"));
        }

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let payload = serde_json::json!({ "chat_id": address, "text": body });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                // Connect/timeout errors are network weather, not a verdict
                // on the recipient.
                VigilError::transient(format!("Telegram send failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &text));
        }

        tracing::debug!("Telegram message delivered to {address}");
        Ok(())
    }
}
