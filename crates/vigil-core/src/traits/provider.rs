//! AI text provider capability.

use crate::error::Result;
use async_trait::async_trait;

/// Generates short message bodies from a prompt.
///
/// Implementations enforce their own hard timeout, which must stay below
/// the scheduler tick interval so a stuck call cannot stall a tick.
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;

    async fn health_check(&self) -> Result<bool>;
}
