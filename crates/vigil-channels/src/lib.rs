//! # Vigil Channels
//!
//! Outbound dispatchers. Each sends a single message to one recipient and
//! classifies the result into transient (retriable within the trigger
//! window) or permanent (recorded, never retried) failure.

pub mod telegram;

pub use telegram::{TelegramDispatcher, TELEGRAM_MAX_BODY_LEN};
