//! Scripted provider for turn runner tests.

use factquest_core::error::ProviderError;
use factquest_core::message::MessageToolCall;
use factquest_core::provider::{ChunkReceiver, Provider, ProviderRequest, StreamChunk, Usage};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// One scripted model round.
pub enum Round {
    /// Stream these text deltas, then finish.
    Text(Vec<&'static str>),
    /// Optionally stream text, then finish with these tool calls.
    Tools(Vec<&'static str>, Vec<MessageToolCall>),
    /// Refuse the request outright.
    Fail(ProviderError),
    /// Stream some deltas, then break the stream.
    BreakAfter(Vec<&'static str>, ProviderError),
}

/// Plays back one `Round` per `stream` call and records every request.
pub struct ScriptedProvider {
    rounds: Mutex<VecDeque<Round>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(rounds: Vec<Round>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let round = self
            .rounds
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedProvider: no more rounds");

        let (tx, rx) = mpsc::channel(32);
        let (texts, calls, failure) = match round {
            Round::Fail(e) => return Err(e),
            Round::Text(texts) => (texts, Vec::new(), None),
            Round::Tools(texts, calls) => (texts, calls, None),
            Round::BreakAfter(texts, e) => (texts, Vec::new(), Some(e)),
        };

        tokio::spawn(async move {
            for text in texts {
                let _ = tx.send(Ok(StreamChunk::text(text))).await;
            }
            match failure {
                Some(e) => {
                    let _ = tx.send(Err(e)).await;
                }
                None => {
                    let usage = Usage {
                        prompt_tokens: 10,
                        completion_tokens: 5,
                        total_tokens: 15,
                    };
                    let _ = tx.send(Ok(StreamChunk::finish(calls, Some(usage)))).await;
                }
            }
        });

        Ok(rx)
    }
}

pub fn news_call(id: &str, query: &str) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: "news_search".into(),
        arguments: serde_json::json!({ "query": query }).to_string(),
    }
}
