//! The FactQuest assistant: its instructions and greeting.

use factquest_config::{AgentSettings, ModelConfig};
use factquest_core::AgentConfig;

pub const ASSISTANT_NAME: &str = "FactQuest";

/// Decision policy for the model: answer from its own knowledge, and reach
/// for `news_search` only for current events.
pub const INSTRUCTIONS: &str = "\
You are FactQuest, an expert assistant.
Use your own knowledge to answer general factual or historical questions.

Only use the `news_search` tool when the user asks about:
- current news or headlines
- recent or trending events
- real-world updates or ongoing situations

Do not use the tool for well-known facts; just answer them directly.
Always cite sources when using the tool.";

/// Sent once when a chat session starts.
pub const WELCOME_MESSAGE: &str = "**Welcome to _FactQuest_!**\n\
Ask me about recent news, past events and trending topics around the world\n\
_Type your question below to begin..._";

/// Bind the instructions to the configured model.
pub fn factquest_agent(model: &ModelConfig, settings: &AgentSettings) -> AgentConfig {
    AgentConfig {
        name: ASSISTANT_NAME.into(),
        instructions: INSTRUCTIONS.into(),
        model: model.model.clone(),
        temperature: model.temperature,
        max_tokens: model.max_tokens,
        max_rounds: settings.max_rounds,
    }
}
