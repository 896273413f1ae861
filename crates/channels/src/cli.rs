//! CLI channel: interactive terminal chat.
//!
//! Reads lines from stdin and writes replies to stdout. Replies are written
//! delta by delta so the answer appears as the model produces it. Used by
//! `factquest chat`.

use async_trait::async_trait;
use factquest_core::channel::{Channel, ChannelId, ChannelMessage, InboundReceiver};
use factquest_core::error::ChannelError;
use std::io::Write;
use std::sync::Mutex;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// Chat id used for the single terminal session.
pub const CLI_CHAT_ID: &str = "cli_session";

type Input = Box<dyn AsyncBufRead + Send + Unpin>;
type Output = Box<dyn Write + Send>;

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    id: ChannelId,
    input: Mutex<Option<Input>>,
    output: Mutex<Output>,
}

impl CliChannel {
    /// A channel on the process's stdin and stdout.
    pub fn new() -> Self {
        Self::with_io(BufReader::new(io::stdin()), std::io::stdout())
    }

    /// A channel on arbitrary input and output.
    pub fn with_io(
        input: impl AsyncBufRead + Send + Unpin + 'static,
        output: impl Write + Send + 'static,
    ) -> Self {
        Self {
            id: ChannelId("cli".into()),
            input: Mutex::new(Some(Box::new(input))),
            output: Mutex::new(Box::new(output)),
        }
    }

    fn write(&self, text: &str, newline: bool) -> Result<(), ChannelError> {
        let mut out = self
            .output
            .lock()
            .map_err(|_| delivery_failed("output lock poisoned"))?;
        let result = if newline {
            writeln!(out, "{text}")
        } else {
            write!(out, "{text}")
        };
        result
            .and_then(|_| out.flush())
            .map_err(|e| delivery_failed(e.to_string()))
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

fn delivery_failed(reason: impl Into<String>) -> ChannelError {
    ChannelError::DeliveryFailed {
        channel: "cli".into(),
        reason: reason.into(),
    }
}

/// Words that end the terminal session.
pub fn is_exit_command(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    async fn start(&self) -> Result<InboundReceiver, ChannelError> {
        let input = self
            .input
            .lock()
            .map_err(|_| ChannelError::ConnectionLost("input lock poisoned".into()))?
            .take()
            .ok_or_else(|| ChannelError::ConnectionLost("CLI input already started".into()))?;

        let (tx, rx) = mpsc::channel(32);
        let channel_id = self.id.clone();

        tokio::spawn(async move {
            let mut lines = input.lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }

                        if is_exit_command(&line) {
                            debug!("Exit command received");
                            break;
                        }

                        let msg = ChannelMessage {
                            channel_id: channel_id.clone(),
                            sender_id: "local_user".into(),
                            content: line,
                            chat_id: CLI_CHAT_ID.into(),
                        };

                        if tx.send(Ok(msg)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF (Ctrl+D)
                    Err(e) => {
                        let _ = tx
                            .send(Err(ChannelError::ConnectionLost(e.to_string())))
                            .await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, _chat_id: &str, content: &str) -> Result<(), ChannelError> {
        self.write(content, true)
    }

    async fn send_delta(&self, _chat_id: &str, delta: &str) -> Result<(), ChannelError> {
        self.write(delta, false)
    }

    async fn end_message(&self, _chat_id: &str) -> Result<(), ChannelError> {
        self.write("", true)
    }
}
