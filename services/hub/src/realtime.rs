//! Realtime chat over WebSocket
//!
//! Frames are JSON objects of the form `{"event": ..., "data": ...}`.
//! Clients send `send_message`; every connected client, the sender
//! included, receives `new_message`.

use axum::{
    extract::{
        State,
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{ctx::Ctx, error::HubResult, state::AppState};

const ROOM_CAPACITY: usize = 100;

/// Payload delivered to every client when a message is posted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatBroadcast {
    pub sender: String,
    pub content: String,
    /// `HH:MM`, UTC
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    SendMessage {
        #[serde(default)]
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    NewMessage(ChatBroadcast),
}

/// The single global chat room
#[derive(Clone)]
pub struct ChatRoom {
    tx: broadcast::Sender<ServerEvent>,
}

impl Default for ChatRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRoom {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(ROOM_CAPACITY);
        Self { tx }
    }

    pub fn join(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Connections currently subscribed to the room
    pub fn member_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Fan an event out to every joined client. Returns how many received it.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        // No receivers is not an error, just an empty room.
        self.tx.send(event).unwrap_or(0)
    }
}

/// Join the room if the connection belongs to a logged-in user.
///
/// Anonymous connections stay open but never receive broadcasts.
pub fn on_connect(room: &ChatRoom, ctx: &Ctx) -> Option<broadcast::Receiver<ServerEvent>> {
    match ctx.user() {
        Some(user) => {
            info!("User {} joined the chat", user.id);
            Some(room.join())
        }
        None => None,
    }
}

/// Handle one `send_message` event.
///
/// The sender is resolved again for every event so a session destroyed by
/// logout stops posting immediately. Events without a user are dropped.
pub async fn on_send_message(
    state: &AppState,
    session_token: Option<&str>,
    message: &str,
) -> HubResult<Option<ChatBroadcast>> {
    let ctx = Ctx::resolve(state, session_token.map(str::to_string)).await?;
    let Some(user) = ctx.user() else {
        debug!("Dropping chat message from anonymous connection");
        return Ok(None);
    };

    let sender = user.display_name().to_string();
    let stored = state
        .messaging
        .post_message(user.id, &sender, message)
        .await?;

    let payload = ChatBroadcast {
        sender,
        content: stored.content.clone(),
        time: stored.display_time(),
    };
    state
        .chat
        .broadcast(ServerEvent::NewMessage(payload.clone()));
    Ok(Some(payload))
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ctx: Ctx,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, ctx))
}

async fn handle_socket(socket: WebSocket, state: AppState, ctx: Ctx) {
    let (mut sender, mut receiver) = socket.split();

    let forward = on_connect(&state.chat, &ctx).map(|mut rx| {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let text = match serde_json::to_string(&event) {
                            Ok(text) => text,
                            Err(e) => {
                                warn!("Failed to encode chat event: {}", e);
                                continue;
                            }
                        };
                        if sender.send(WsMessage::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Chat client lagged, skipped {} messages", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    });

    while let Some(Ok(frame)) = receiver.next().await {
        let text = match frame {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => break,
            _ => continue,
        };

        match serde_json::from_str::<ClientEvent>(&text) {
            Ok(ClientEvent::SendMessage { message }) => {
                if let Err(e) = on_send_message(&state, ctx.session_token(), &message).await {
                    warn!("Failed to post chat message: {}", e);
                }
            }
            Err(e) => debug!("Ignoring malformed chat frame: {}", e),
        }
    }

    if let Some(task) = forward {
        task.abort();
    }
    if let Some(user) = ctx.user() {
        info!("User {} left the chat", user.id);
    }
}
