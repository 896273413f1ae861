//! Turn-level streaming events.
//!
//! `AgentStreamEvent` wraps provider-level stream chunks into higher-level
//! events that a chat surface can render or forward over WebSocket.

use factquest_core::provider::Usage;
use serde::{Deserialize, Serialize};

/// Events emitted while a turn runs.
///
/// - `chunk`: partial text token from the model
/// - `tool_call`: the model asked for a tool
/// - `tool_result`: the tool finished
/// - `done`: the assistant reply was appended to history
/// - `error`: the model call failed; nothing was appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// Partial text token from the model.
    Chunk { content: String },

    /// The model is calling a tool.
    ToolCall {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// Tool execution completed.
    ToolResult {
        id: String,
        name: String,
        output: String,
        success: bool,
    },

    /// The turn is complete.
    Done {
        conversation_id: String,
        usage: Option<Usage>,
        rounds: u32,
        tool_calls_made: usize,
    },

    /// The turn failed.
    Error { message: String },
}

impl AgentStreamEvent {
    /// Wire name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Chunk { .. } => "chunk",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_chunk() {
        let event = AgentStreamEvent::Chunk {
            content: "George".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"chunk","content":"George"}"#);
    }

    #[test]
    fn event_serialization_tool_call() {
        let event = AgentStreamEvent::ToolCall {
            id: "call_1".into(),
            name: "news_search".into(),
            input: serde_json::json!({"query": "mars rover"}),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"tool_call""#));
        assert!(json.contains(r#""name":"news_search""#));
    }

    #[test]
    fn event_serialization_done() {
        let event = AgentStreamEvent::Done {
            conversation_id: "abc".into(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            }),
            rounds: 2,
            tool_calls_made: 1,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"done""#));
        assert!(json.contains(r#""rounds":2"#));
        assert!(event.is_terminal());
    }

    #[test]
    fn event_type_names() {
        let cases = [
            (
                AgentStreamEvent::Chunk {
                    content: "x".into(),
                },
                "chunk",
            ),
            (
                AgentStreamEvent::ToolResult {
                    id: "a".into(),
                    name: "b".into(),
                    output: "c".into(),
                    success: true,
                },
                "tool_result",
            ),
            (
                AgentStreamEvent::Error {
                    message: "x".into(),
                },
                "error",
            ),
        ];
        for (event, name) in cases {
            assert_eq!(event.event_type(), name);
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], name);
        }
    }

    #[test]
    fn event_deserialization() {
        let json = r#"{"type":"error","message":"upstream down"}"#;
        let event: AgentStreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            AgentStreamEvent::Error {
                message: "upstream down".into()
            }
        );
        assert!(event.is_terminal());
    }
}
