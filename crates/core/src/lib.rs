//! # FactQuest Core
//!
//! Domain types, traits, and error definitions for the FactQuest assistant.
//! This crate has no HTTP or UI dependencies: it defines the model that the
//! provider, tool, agent, and gateway crates implement against.
//!
//! Every collaborator at a seam (language model, tool, chat surface) is a
//! trait here, so tests can substitute scripted implementations.

pub mod agent;
pub mod channel;
pub mod error;
pub mod message;
pub mod provider;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::AgentConfig;
pub use channel::{Channel, ChannelId, ChannelMessage};
pub use error::{Error, Result};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, StreamChunk, ToolDefinition};
pub use session::{SessionHandle, SessionStore};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
