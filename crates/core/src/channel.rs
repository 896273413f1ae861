//! Channel trait: the abstraction over chat surfaces.
//!
//! A Channel delivers user messages into the assistant and displays replies.
//! Replies arrive token by token, so a channel can grow the visible message
//! in place with `send_delta`.

use crate::error::ChannelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Unique identifier for a channel instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message received from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub channel_id: ChannelId,

    /// Sender identifier (surface-specific)
    pub sender_id: String,

    /// The text content
    pub content: String,

    /// The chat identifier within the channel; maps to a session
    pub chat_id: String,
}

/// Stream of inbound messages produced by `Channel::start`.
pub type InboundReceiver = mpsc::Receiver<Result<ChannelMessage, ChannelError>>;

#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    fn id(&self) -> &ChannelId;

    /// Start listening. Inbound messages arrive on the returned receiver,
    /// which closes when the user leaves.
    async fn start(&self) -> Result<InboundReceiver, ChannelError>;

    /// Send a complete message.
    async fn send(&self, chat_id: &str, content: &str) -> Result<(), ChannelError>;

    /// Append a fragment to the message currently being displayed.
    async fn send_delta(&self, chat_id: &str, delta: &str) -> Result<(), ChannelError> {
        self.send(chat_id, delta).await
    }

    /// Close the message currently being displayed.
    async fn end_message(&self, _chat_id: &str) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records everything sent to it.
    struct RecordingChannel {
        id: ChannelId,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        fn name(&self) -> &str {
            "recording"
        }
        fn id(&self) -> &ChannelId {
            &self.id
        }
        async fn start(&self) -> Result<InboundReceiver, ChannelError> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }
        async fn send(&self, _chat_id: &str, content: &str) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(content.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn send_delta_defaults_to_send() {
        let ch = RecordingChannel {
            id: ChannelId("recording".into()),
            sent: Mutex::new(vec![]),
        };
        ch.send_delta("chat", "George ").await.unwrap();
        ch.send_delta("chat", "Washington").await.unwrap();
        ch.end_message("chat").await.unwrap();
        assert_eq!(*ch.sent.lock().unwrap(), vec!["George ", "Washington"]);
    }

    #[test]
    fn channel_id_display() {
        assert_eq!(ChannelId("cli".into()).to_string(), "cli");
    }
}
