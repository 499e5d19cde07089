//! # Vigil Core
//!
//! Core traits, types, and configuration for the Vigil notification
//! scheduling & delivery engine. Everything here is implementation-free:
//! the leaf crates (store, providers, content, channels, scheduler,
//! broadcast) implement the capabilities declared in [`traits`].

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::VigilConfig;
pub use error::{Result, VigilError};
