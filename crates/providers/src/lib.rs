//! Language-model provider implementations for FactQuest.
//!
//! All providers implement the `factquest_core::Provider` trait. The hosted
//! model is reached through its OpenAI-compatible chat-completions endpoint.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
