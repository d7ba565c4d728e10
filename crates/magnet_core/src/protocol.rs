//! Wire protocol types.
//!
//! Messages are JSON, tagged with a `type` field and carrying camelCase
//! payload fields, matching the deployed browser client. Snapshots are
//! the full authoritative room state; there is no delta encoding, so a
//! client that misses a frame is consistent again on the next one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::WorldBounds;
use crate::magnet::{Magnet, MagnetId, Player, PlayerId};
use crate::room::GamePhase;

/// Commands a client can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a room, optionally by code, optionally proposing a magnet count.
    #[serde(rename_all = "camelCase")]
    Join {
        /// Display name.
        username: String,
        /// Explicit room code; omitted for automatic matchmaking.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_code: Option<String>,
        /// Proposed per-player magnet count for a fresh room.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        magnet_count: Option<usize>,
    },
    /// Mark the sender ready (waiting phase only).
    PlayerReady,
    /// Place a magnet at the given board position.
    PlaceMagnet {
        /// Board X.
        x: f64,
        /// Board Y.
        y: f64,
    },
    /// Change the room's per-player magnet count (waiting phase only).
    #[serde(rename_all = "camelCase")]
    SetMagnetCount {
        /// Requested count; out-of-range values are ignored.
        magnet_count: usize,
    },
}

/// A player as serialized to clients: counts, not stacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Stable identity.
    pub id: PlayerId,
    /// Display name.
    pub username: String,
    /// Palette color.
    pub color: String,
    /// Unplaced magnets left (the stack length).
    pub magnets_remaining: usize,
    /// Ready flag.
    pub is_ready: bool,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            username: player.username.clone(),
            color: player.color.clone(),
            magnets_remaining: player.remaining(),
            is_ready: player.is_ready,
        }
    }
}

/// Full authoritative state of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Every player in the room, keyed by id.
    pub players: HashMap<PlayerId, PlayerView>,
    /// Every magnet in the room, placed or stacked.
    pub magnets: Vec<Magnet>,
    /// Whose turn it is; absent outside the playing phase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_turn: Option<PlayerId>,
    /// Room lifecycle phase.
    pub game_phase: GamePhase,
    /// Winner; absent outside the finished phase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
    /// Configured magnets per player.
    pub magnet_count: usize,
    /// Playfield size.
    pub world_bounds: WorldBounds,
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First message to a joiner: their id, the room code, and the state.
    #[serde(rename_all = "camelCase")]
    Welcome {
        /// The joiner's assigned id.
        player_id: PlayerId,
        /// The room they landed in.
        room_code: String,
        /// Current room state.
        state: GameSnapshot,
    },
    /// Periodic full-state broadcast.
    GameState {
        /// Current room state.
        state: GameSnapshot,
    },
    /// Another player joined the room.
    PlayerJoined {
        /// The new player.
        player: PlayerView,
    },
    /// A player left the room.
    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        /// The leaver's id.
        player_id: PlayerId,
    },
    /// The requested room cannot take another player.
    RoomFull,
    /// The requested room code does not exist.
    RoomNotFound,
    /// All players readied; the game begins.
    GameStarted,
    /// Settling disturbed these magnets; they were swept to the acting
    /// player's stack.
    #[serde(rename_all = "camelCase")]
    MagnetsMoved {
        /// Ids of the disturbed magnets.
        moved_magnets: Vec<MagnetId>,
    },
    /// The game ended.
    GameOver {
        /// The winning player.
        winner: PlayerView,
    },
}

/// A routed outbound message produced by a room mutation.
///
/// The room decides *what* to send and *to whom*; the server crate owns
/// the channels and performs the best-effort fan-out.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Send to every member of the room.
    Broadcast(ServerMessage),
    /// Send to every member except one (e.g. the joiner already got
    /// `welcome`).
    BroadcastExcept(PlayerId, ServerMessage),
    /// Send to a single member.
    To(PlayerId, ServerMessage),
}
