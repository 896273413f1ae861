//! `GET /ws`: one chat session per WebSocket connection.
//!
//! Protocol:
//! - Server → Client on connect: `{ "type": "welcome", "content": "...", "session_id": "..." }`
//! - Client → Server: `{ "type": "message", "content": "..." }`
//! - Server → Client: `AgentStreamEvent` JSON frames (chunk, tool_call, tool_result, done, error)
//!
//! The session is created on upgrade and evicted when the socket closes.
//! Frames are handled one at a time, so turns within a session never overlap.

use crate::{MAX_BODY_BYTES, SharedState};
use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use factquest_agent::{AgentStreamEvent, WELCOME_MESSAGE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.max_message_size(MAX_BODY_BYTES)
        .on_upgrade(move |socket| handle_connection(socket, state))
}

/// Frame sent once when a session opens.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerFrame<'a> {
    Welcome {
        content: &'a str,
        session_id: &'a str,
    },
}

/// WebSocket message from the client.
#[derive(Deserialize)]
struct ClientFrame {
    #[serde(rename = "type")]
    frame_type: String,
    #[serde(default)]
    content: String,
}

async fn send_json<T: Serialize>(socket: &mut WebSocket, frame: &T) -> bool {
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to encode frame");
            return true;
        }
    };
    socket.send(WsMessage::Text(json.into())).await.is_ok()
}

async fn send_error(socket: &mut WebSocket, message: String) -> bool {
    send_json(socket, &AgentStreamEvent::Error { message }).await
}

async fn handle_connection(mut socket: WebSocket, state: SharedState) {
    let (session_id, session) = match state.sessions.create().await {
        Ok(created) => created,
        Err(e) => {
            warn!(error = %e, "Rejecting WebSocket connection");
            let _ = send_error(&mut socket, e.to_string()).await;
            let _ = socket.send(WsMessage::Close(None)).await;
            return;
        }
    };
    let id = session_id.to_string();
    info!(session_id = %id, "Chat session started");

    let welcome = ServerFrame::Welcome {
        content: WELCOME_MESSAGE,
        session_id: &id,
    };

    if send_json(&mut socket, &welcome).await {
        'frames: while let Some(msg) = socket.recv().await {
            let text = match msg {
                Ok(WsMessage::Text(text)) => text,
                Ok(WsMessage::Close(_)) => break,
                Ok(_) => continue, // ignore binary, ping, pong
                Err(e) => {
                    debug!(session_id = %id, error = %e, "WebSocket receive failed");
                    break;
                }
            };

            let frame: ClientFrame = match serde_json::from_str(&text) {
                Ok(frame) => frame,
                Err(e) => {
                    if !send_error(&mut socket, format!("Invalid message: {e}")).await {
                        break;
                    }
                    continue;
                }
            };

            if frame.frame_type != "message" {
                let message = format!("Unknown message type: '{}'", frame.frame_type);
                if !send_error(&mut socket, message).await {
                    break;
                }
                continue;
            }

            if frame.content.trim().is_empty() {
                if !send_error(&mut socket, "Message is empty".into()).await {
                    break;
                }
                continue;
            }

            let mut events = state.runner.run_turn(session.clone(), frame.content);
            while let Some(event) = events.recv().await {
                if !send_json(&mut socket, &event).await {
                    break 'frames; // client disconnected
                }
            }
        }
    }

    state.sessions.evict(&session_id).await;
    info!(session_id = %id, "Chat session closed");
}
