//! Agent configuration.

use serde::{Deserialize, Serialize};

/// A named binding of instructions, model, and sampling settings.
///
/// The agent itself has no branching logic: whether to answer directly or
/// call a tool is decided by the model from `instructions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,

    /// System instruction sent at the head of every request
    pub instructions: String,

    /// Model identifier on the provider
    pub model: String,

    #[serde(default = "default_temp")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Maximum model rounds (request + stream) per user turn
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

fn default_temp() -> f32 {
    0.7
}
fn default_max_rounds() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: AgentConfig = serde_json::from_str(
            r#"{"name":"FactQuest","instructions":"Be helpful","model":"gemini-2.0-flash"}"#,
        )
        .unwrap();
        assert_eq!(cfg.max_rounds, 5);
        assert!((cfg.temperature - 0.7).abs() < f32::EPSILON);
        assert!(cfg.max_tokens.is_none());
    }
}
