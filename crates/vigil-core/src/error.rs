//! Unified error types for the Vigil engine.

use thiserror::Error;

/// Result type alias using VigilError.
pub type Result<T> = std::result::Result<T, VigilError>;

#[derive(Error, Debug)]
pub enum VigilError {
    // Channel errors — the transient/permanent split drives the retry rule:
    // transient failures may be retried once while still inside the trigger
    // window, permanent failures are recorded and never retried.
    #[error("Transient channel error: {0}")]
    ChannelTransient(String),

    #[error("Permanent channel error: {0}")]
    ChannelPermanent(String),

    // Provider errors
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Content generation error: {0}")]
    Content(String),

    // Persistence errors
    #[error("Store error: {0}")]
    Store(String),

    #[error("Registry error: {0}")]
    Registry(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

impl VigilError {
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::ChannelTransient(msg.into())
    }

    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::ChannelPermanent(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether a delivery failure with this error may be retried on a later
    /// tick. Only channel errors reach this check; anything unclassified is
    /// treated as transient so a flaky dependency cannot permanently silence
    /// a reminder.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::ChannelPermanent(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VigilError::ChannelTransient("rate limited".into());
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_error_constructors() {
        let e1 = VigilError::transient("test");
        assert!(matches!(e1, VigilError::ChannelTransient(_)));

        let e2 = VigilError::permanent("test");
        assert!(matches!(e2, VigilError::ChannelPermanent(_)));

        let e3 = VigilError::provider("test");
        assert!(matches!(e3, VigilError::Provider(_)));

        let e4 = VigilError::store("test");
        assert!(matches!(e4, VigilError::Store(_)));
    }

    #[test]
    fn test_transient_classification() {
        assert!(VigilError::transient("429").is_transient());
        assert!(VigilError::Timeout("send".into()).is_transient());
        assert!(!VigilError::permanent("bad recipient").is_transient());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VigilError = io_err.into();
        assert!(matches!(err, VigilError::Io(_)));
    }
}
