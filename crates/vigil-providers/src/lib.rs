//! # Vigil Providers
//!
//! AI text provider implementations. One OpenAI-compatible HTTP client
//! covers both hosted APIs and local servers (Ollama, llama.cpp) — they all
//! speak the same chat-completions shape.

pub mod openai;

pub use openai::OpenAiCompatProvider;
