//! Outbound channel capability.

use crate::error::Result;
use async_trait::async_trait;

/// Sends a single message to one recipient through an external messaging
/// channel.
///
/// Implementations classify failures into `VigilError::ChannelTransient`
/// (rate limits, network) and `VigilError::ChannelPermanent` (invalid
/// recipient, oversized body). Length validation is the content side's job;
/// a dispatcher rejects oversized input rather than truncating it.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    fn name(&self) -> &str;

    /// Maximum body length the channel accepts, in characters.
    fn max_body_len(&self) -> usize;

    async fn send(&self, address: &str, body: &str) -> Result<()>;
}
