//! Relay a turn's events onto a chat surface.
//!
//! Text deltas grow the current message in place; a tool call closes it and
//! shows a short status line; an error is shown inline.

use crate::stream_event::AgentStreamEvent;
use factquest_core::channel::Channel;
use factquest_core::error::ChannelError;
use tokio::sync::mpsc;

/// How a relayed turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Failed(String),
    /// The event stream closed without a terminal event.
    Abandoned,
}

/// Status line shown while the news tool runs.
pub fn tool_status_line(name: &str, input: &serde_json::Value) -> String {
    match input["query"].as_str() {
        Some(query) if name == "news_search" => format!("[searching news: {query}]"),
        _ => format!("[calling {name}]"),
    }
}

/// Forward every event to `channel` until the turn ends.
pub async fn relay_to_channel(
    mut events: mpsc::Receiver<AgentStreamEvent>,
    channel: &dyn Channel,
    chat_id: &str,
) -> Result<TurnOutcome, ChannelError> {
    let mut open = false;

    while let Some(event) = events.recv().await {
        match event {
            AgentStreamEvent::Chunk { content } => {
                channel.send_delta(chat_id, &content).await?;
                open = true;
            }
            AgentStreamEvent::ToolCall { name, input, .. } => {
                if open {
                    channel.end_message(chat_id).await?;
                    open = false;
                }
                channel.send(chat_id, &tool_status_line(&name, &input)).await?;
            }
            AgentStreamEvent::ToolResult { .. } => {}
            AgentStreamEvent::Done { .. } => {
                if open {
                    channel.end_message(chat_id).await?;
                }
                return Ok(TurnOutcome::Completed);
            }
            AgentStreamEvent::Error { message } => {
                if open {
                    channel.end_message(chat_id).await?;
                }
                channel.send(chat_id, &format!("[error] {message}")).await?;
                return Ok(TurnOutcome::Failed(message));
            }
        }
    }

    if open {
        channel.end_message(chat_id).await?;
    }
    Ok(TurnOutcome::Abandoned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use factquest_core::channel::{ChannelId, InboundReceiver};
    use std::sync::Mutex;

    /// Renders deltas, full messages and message ends into one transcript.
    struct Transcript {
        id: ChannelId,
        text: Mutex<String>,
    }

    impl Transcript {
        fn new() -> Self {
            Self {
                id: ChannelId("transcript".into()),
                text: Mutex::new(String::new()),
            }
        }
    }

    #[async_trait]
    impl Channel for Transcript {
        fn name(&self) -> &str {
            "transcript"
        }
        fn id(&self) -> &ChannelId {
            &self.id
        }
        async fn start(&self) -> Result<InboundReceiver, ChannelError> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }
        async fn send(&self, _chat_id: &str, content: &str) -> Result<(), ChannelError> {
            let mut text = self.text.lock().unwrap();
            text.push_str(content);
            text.push('\n');
            Ok(())
        }
        async fn send_delta(&self, _chat_id: &str, delta: &str) -> Result<(), ChannelError> {
            self.text.lock().unwrap().push_str(delta);
            Ok(())
        }
        async fn end_message(&self, _chat_id: &str) -> Result<(), ChannelError> {
            self.text.lock().unwrap().push('\n');
            Ok(())
        }
    }

    async fn relay(events: Vec<AgentStreamEvent>) -> (TurnOutcome, String) {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);
        let channel = Transcript::new();
        let outcome = relay_to_channel(rx, &channel, "chat").await.unwrap();
        let text = channel.text.lock().unwrap().clone();
        (outcome, text)
    }

    fn chunk(s: &str) -> AgentStreamEvent {
        AgentStreamEvent::Chunk { content: s.into() }
    }

    fn done() -> AgentStreamEvent {
        AgentStreamEvent::Done {
            conversation_id: "c".into(),
            usage: None,
            rounds: 1,
            tool_calls_made: 0,
        }
    }

    #[tokio::test]
    async fn deltas_then_done() {
        let (outcome, text) = relay(vec![chunk("George "), chunk("Washington."), done()]).await;
        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(text, "George Washington.\n");
    }

    #[tokio::test]
    async fn tool_call_shows_status_line() {
        let (outcome, text) = relay(vec![
            AgentStreamEvent::ToolCall {
                id: "call_1".into(),
                name: "news_search".into(),
                input: serde_json::json!({"query": "mars rover"}),
            },
            AgentStreamEvent::ToolResult {
                id: "call_1".into(),
                name: "news_search".into(),
                output: "- [a](b): c".into(),
                success: true,
            },
            chunk("Here is the latest."),
            done(),
        ])
        .await;
        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(text, "[searching news: mars rover]\nHere is the latest.\n");
    }

    #[tokio::test]
    async fn error_is_shown_inline() {
        let (outcome, text) = relay(vec![
            chunk("Geo"),
            AgentStreamEvent::Error {
                message: "Stream error: reset".into(),
            },
        ])
        .await;
        assert_eq!(outcome, TurnOutcome::Failed("Stream error: reset".into()));
        assert_eq!(text, "Geo\n[error] Stream error: reset\n");
    }

    #[tokio::test]
    async fn closed_stream_is_abandoned() {
        let (outcome, _) = relay(vec![chunk("partial")]).await;
        assert_eq!(outcome, TurnOutcome::Abandoned);
    }

    #[test]
    fn status_line_for_other_tools() {
        assert_eq!(
            tool_status_line("weather", &serde_json::json!({})),
            "[calling weather]"
        );
    }
}
