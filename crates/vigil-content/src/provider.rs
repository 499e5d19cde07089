//! Generated-or-fallback content selection with a per-date cache.

use crate::fallback::FallbackPool;
use chrono::NaiveDate;
use std::sync::Arc;
use vigil_core::error::Result;
use vigil_core::traits::{ContentCache, TextProvider};
use vigil_core::types::{ContentSource, ContentUnit, Recipient};

/// The single decision point between the two content sources. Callers never
/// see a generation error; they always get a body.
pub struct ContentProvider {
    provider: Option<Arc<dyn TextProvider>>,
    cache: Arc<dyn ContentCache>,
    max_len: usize,
}

impl ContentProvider {
    pub fn new(
        provider: Option<Arc<dyn TextProvider>>,
        cache: Arc<dyn ContentCache>,
        max_len: usize,
    ) -> Self {
        Self { provider, cache, max_len }
    }

    /// The day's devotional body. Cache hit → done; otherwise try the AI
    /// provider once, validate against the length budget, and fall back to
    /// the deterministic pool on any failure. The winner is cached so
    /// repeated triggers (many recipients, retried ticks) never re-invoke
    /// the provider.
    pub async fn daily(&self, date: NaiveDate) -> Result<ContentUnit> {
        if let Some(cached) = self.cache.get(date).await? {
            return Ok(cached);
        }

        let unit = match self.try_generate(date).await {
            Some(body) => ContentUnit { date, body, source: ContentSource::Generated },
            None => ContentUnit {
                date,
                body: FallbackPool::body_for(date).to_string(),
                source: ContentSource::Fallback,
            },
        };

        // A cache write failure costs an extra generation later, not a
        // missed reminder.
        if let Err(e) = self.cache.put(&unit).await {
            tracing::warn!("Content cache write failed for {date}: {e}");
        }
        Ok(unit)
    }

    async fn try_generate(&self, date: NaiveDate) -> Option<String> {
        let provider = self.provider.as_ref()?;
        let prompt = format!(
            "Write a short devotional encouragement (2-3 sentences, no heading) \
             for people keeping a prayer vigil on {}. Warm, scriptural tone.",
            date.format("%A, %B %e")
        );

        match provider.generate(&prompt).await {
            Ok(body) => {
                let body = self.fit_to_budget(body);
                if body.is_empty() {
                    tracing::warn!("Provider returned empty body for {date}, using fallback");
                    None
                } else {
                    Some(body)
                }
            }
            Err(e) => {
                tracing::warn!("Content generation failed for {date}: {e}, using fallback");
                None
            }
        }
    }

    /// Truncate to the length budget on a char boundary, with an ellipsis.
    fn fit_to_budget(&self, body: String) -> String {
        let body = body.trim().to_string();
        if body.chars().count() <= self.max_len {
            return body;
        }
        let mut truncated: String = body.chars().take(self.max_len.saturating_sub(1)).collect();
        truncated.push('…');
        truncated
    }

    /// Broadcast personalization: substitute the recipient's name into the
    /// authored message. Deterministic, no provider round-trip, so fan-out
    /// never depends on provider health. Length validation lives here, not
    /// in the dispatcher: an oversized authored message is truncated to the
    /// budget instead of being rejected per recipient downstream.
    pub fn personalize(&self, message: &str, recipient: &Recipient) -> String {
        let name = recipient.name.as_deref().unwrap_or("friend");
        self.fit_to_budget(message.replace("{name}", name))
    }
}
