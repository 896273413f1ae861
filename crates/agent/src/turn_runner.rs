//! The turn runner: one user message in, one streamed assistant reply out.
//!
//! A turn:
//!
//! 1. Locks the session and appends the user message
//! 2. Sends system instructions + full history + tool definitions to the model
//! 3. Forwards every text delta as it arrives
//! 4. **If tool calls**: runs them, feeds the results back, loops to step 2
//! 5. **If text only**: appends the concatenated deltas as the assistant reply
//!
//! Tool messages live only for the duration of the turn; history keeps the
//! user/assistant pairs. If the model call fails, an `Error` event is sent
//! and history keeps just the user message.

use crate::stream_event::AgentStreamEvent;
use factquest_config::{AppConfig, Secrets};
use factquest_core::message::{Message, MessageToolCall};
use factquest_core::provider::{Provider, ProviderRequest, Usage};
use factquest_core::tool::{ToolCall, ToolRegistry};
use factquest_core::{AgentConfig, SessionHandle};
use factquest_providers::OpenAiCompatProvider;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Appended when the round limit is hit before the model produced any text.
pub const ROUND_LIMIT_NOTICE: &str =
    "I couldn't finish looking that up. Please try asking again.";

const EVENT_BUFFER: usize = 128;

/// Runs turns for one assistant definition. Cheap to share across sessions.
pub struct TurnRunner {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    agent: AgentConfig,
}

impl TurnRunner {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, agent: AgentConfig) -> Self {
        Self {
            provider,
            tools,
            agent,
        }
    }

    /// Wire the hosted model, the news tool, and the FactQuest agent.
    pub fn from_config(config: &AppConfig, secrets: &Secrets) -> factquest_core::Result<Self> {
        let provider = OpenAiCompatProvider::from_config(&config.model, &secrets.gemini_api_key)?;
        let tools = factquest_tools::default_registry(&config.news, &secrets.news_api_key)?;
        let agent = crate::assistant::factquest_agent(&config.model, &config.agent);
        info!(
            agent = %agent.name,
            provider = %provider.name(),
            model = %agent.model,
            tools = ?tools.names(),
            "Turn runner ready"
        );
        Ok(Self::new(Arc::new(provider), Arc::new(tools), agent))
    }

    /// Start a turn. Events arrive on the returned receiver; the last one
    /// is always `Done` or `Error`.
    ///
    /// The session stays locked until the turn ends, so a second turn on the
    /// same session waits for the first. Dropping the receiver abandons the
    /// turn at its next event.
    pub fn run_turn(
        &self,
        session: SessionHandle,
        user_text: impl Into<String>,
    ) -> mpsc::Receiver<AgentStreamEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let provider = self.provider.clone();
        let tools = self.tools.clone();
        let agent = self.agent.clone();
        let user_text = user_text.into();

        tokio::spawn(async move {
            let mut conv = session.lock_owned().await;
            conv.push(Message::user(user_text));
            let conversation_id = conv.id.to_string();

            let mut messages = Vec::with_capacity(conv.len() + 1);
            messages.push(Message::system(&agent.instructions));
            messages.extend(conv.messages.iter().cloned());

            let tool_defs = tools.definitions();
            let mut reply = String::new();
            let mut usage: Option<Usage> = None;
            let mut rounds = 0u32;
            let mut tool_calls_made = 0usize;
            let mut finished = false;

            while rounds < agent.max_rounds {
                rounds += 1;

                let request = ProviderRequest {
                    model: agent.model.clone(),
                    messages: messages.clone(),
                    temperature: agent.temperature,
                    max_tokens: agent.max_tokens,
                    tools: tool_defs.clone(),
                    stream: true,
                };

                debug!(%conversation_id, round = rounds, "Requesting model round");
                let mut stream_rx = match provider.stream(request).await {
                    Ok(rx) => rx,
                    Err(e) => {
                        warn!(%conversation_id, error = %e, "Model request failed");
                        let _ = tx
                            .send(AgentStreamEvent::Error {
                                message: format!("Provider error: {e}"),
                            })
                            .await;
                        return;
                    }
                };

                let mut round_text = String::new();
                let mut round_calls: Vec<MessageToolCall> = Vec::new();

                while let Some(chunk_result) = stream_rx.recv().await {
                    match chunk_result {
                        Ok(chunk) => {
                            if let Some(text) = chunk.content
                                && !text.is_empty()
                            {
                                round_text.push_str(&text);
                                if tx.send(AgentStreamEvent::Chunk { content: text }).await.is_err()
                                {
                                    debug!(%conversation_id, "Listener gone, abandoning turn");
                                    return;
                                }
                            }
                            round_calls.extend(chunk.tool_calls);
                            if chunk.usage.is_some() {
                                usage = chunk.usage;
                            }
                        }
                        Err(e) => {
                            warn!(%conversation_id, error = %e, "Model stream failed");
                            let _ = tx
                                .send(AgentStreamEvent::Error {
                                    message: format!("Stream error: {e}"),
                                })
                                .await;
                            return;
                        }
                    }
                }

                reply.push_str(&round_text);

                if round_calls.is_empty() {
                    finished = true;
                    break;
                }

                let mut assistant_msg = Message::assistant(round_text);
                assistant_msg.tool_calls = round_calls.clone();
                messages.push(assistant_msg);

                for tc in &round_calls {
                    tool_calls_made += 1;
                    let Some((output, success)) = run_tool(&tools, tc, &tx).await else {
                        debug!(%conversation_id, "Listener gone, abandoning turn");
                        return;
                    };
                    let result = AgentStreamEvent::ToolResult {
                        id: tc.id.clone(),
                        name: tc.name.clone(),
                        output: output.clone(),
                        success,
                    };
                    if tx.send(result).await.is_err() {
                        debug!(%conversation_id, "Listener gone, abandoning turn");
                        return;
                    }
                    messages.push(Message::tool_result(&tc.id, output));
                }
            }

            if !finished {
                warn!(%conversation_id, rounds, "Round limit reached");
                if reply.is_empty() {
                    reply.push_str(ROUND_LIMIT_NOTICE);
                    let _ = tx
                        .send(AgentStreamEvent::Chunk {
                            content: ROUND_LIMIT_NOTICE.into(),
                        })
                        .await;
                }
            }

            conv.push(Message::assistant(reply));
            info!(%conversation_id, rounds, tool_calls_made, "Turn complete");

            let _ = tx
                .send(AgentStreamEvent::Done {
                    conversation_id,
                    usage,
                    rounds,
                    tool_calls_made,
                })
                .await;
        });

        rx
    }
}

/// Execute one model-issued call. Any failure becomes `Error: ...` output.
/// Returns `None` once nobody is listening, without running the tool.
async fn run_tool(
    tools: &ToolRegistry,
    tc: &MessageToolCall,
    tx: &mpsc::Sender<AgentStreamEvent>,
) -> Option<(String, bool)> {
    let call = match ToolCall::from_message_call(tc) {
        Ok(call) => call,
        Err(e) => {
            tx.send(AgentStreamEvent::ToolCall {
                id: tc.id.clone(),
                name: tc.name.clone(),
                input: serde_json::Value::String(tc.arguments.clone()),
            })
            .await
            .ok()?;
            return Some((format!("Error: {e}"), false));
        }
    };

    tx.send(AgentStreamEvent::ToolCall {
        id: call.id.clone(),
        name: call.name.clone(),
        input: call.arguments.clone(),
    })
    .await
    .ok()?;

    debug!(tool = %call.name, "Executing tool");
    match tools.execute(&call).await {
        Ok(result) => Some((result.output, result.success)),
        Err(e) => {
            warn!(tool = %call.name, error = %e, "Tool call rejected");
            Some((format!("Error: {e}"), false))
        }
    }
}
