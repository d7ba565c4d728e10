//! Per-client WebSocket handling.
//!
//! Each connection gets a reader loop (decode, dispatch) and a writer
//! task fed by an unbounded channel. Malformed frames are logged and
//! dropped with the connection left open; a closed socket is a normal
//! disconnect, never an error surfaced to the room.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use magnet_core::error::GameError;
use magnet_core::magnet::PlayerId;
use magnet_core::protocol::{ClientMessage, ServerMessage};

use crate::registry::{spawn_room_reaper, PeerSender, Registry};
use crate::ServerConfig;

/// Drive one client connection to completion.
pub async fn handle_connection(
    registry: Arc<Registry>,
    config: ServerConfig,
    stream: TcpStream,
    peer_addr: String,
) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(err) => {
            debug!(peer = %peer_addr, %err, "websocket handshake failed");
            return;
        }
    };
    info!(peer = %peer_addr, "client connected");

    let (mut ws_tx, mut ws_rx) = ws.split();
    let (sender, mut outbox) = mpsc::unbounded_channel::<Message>();

    // Writer task: drains the outbox until the channel or socket closes.
    let writer = tokio::spawn(async move {
        while let Some(msg) = outbox.recv().await {
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut player_id: Option<PlayerId> = None;
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                dispatch(&registry, &sender, &mut player_id, &text);
            }
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {} // ping/pong/binary: nothing to do
        }
    }

    if let Some(player_id) = player_id {
        info!(peer = %peer_addr, player = %player_id, "client disconnected");
        if let Some(code) = registry.disconnect(player_id) {
            spawn_room_reaper(registry, code, config.empty_room_grace);
        }
    } else {
        info!(peer = %peer_addr, "client disconnected before joining");
    }
    writer.abort();
}

/// Decode and route one inbound frame.
fn dispatch(
    registry: &Registry,
    sender: &PeerSender,
    player_id: &mut Option<PlayerId>,
    text: &str,
) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(err) => {
            warn!(%err, "dropping malformed message");
            return;
        }
    };

    match (msg, *player_id) {
        (
            ClientMessage::Join {
                username,
                room_code,
                magnet_count,
            },
            None,
        ) => match registry.join(username, room_code, magnet_count, sender.clone()) {
            Ok((id, code)) => {
                debug!(player = %id, room = %code, "join resolved");
                *player_id = Some(id);
            }
            Err(err) => {
                let reply = match err {
                    GameError::RoomFull(_) => ServerMessage::RoomFull,
                    GameError::RoomNotFound(_) => ServerMessage::RoomNotFound,
                    GameError::PlayerNotFound => return,
                };
                if let Ok(text) = serde_json::to_string(&reply) {
                    let _ = sender.send(Message::Text(text));
                }
            }
        },
        (ClientMessage::Join { .. }, Some(_)) => {
            debug!("join from an already-joined connection, ignored");
        }
        (msg, Some(id)) => registry.handle_command(id, msg),
        (_, None) => {
            debug!("command before join, ignored");
        }
    }
}
