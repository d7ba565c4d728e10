//! Room registry and matchmaker.
//!
//! Owns the `code -> room` and `player -> room` maps under one lock,
//! distinct from each room's own lock. Each room gets an independent
//! tick task; a room that empties is reaped after a grace period if it is
//! still empty at expiry. Lock order where nesting is unavoidable is
//! registry before room, never the reverse.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use magnet_core::config::{GameConfig, ROOM_CODE_ALPHABET, ROOM_CODE_LEN};
use magnet_core::error::{GameError, Result};
use magnet_core::magnet::PlayerId;
use magnet_core::protocol::{ClientMessage, Outbound, ServerMessage};
use magnet_core::room::Room;

/// Per-player sender for outbound WebSocket messages. A send to a closed
/// channel is dropped without error.
pub type PeerSender = mpsc::UnboundedSender<Message>;

/// One room plus its members' outbound channels, guarded together so a
/// mutation and its fan-out are atomic with respect to other commands.
pub struct RoomSlot {
    /// The authoritative game state.
    pub room: Room,
    /// Outbound channel per connected member.
    pub peers: HashMap<PlayerId, PeerSender>,
}

impl RoomSlot {
    /// Deliver routed events to the members' channels, best effort.
    pub fn fan_out(&self, events: Vec<Outbound>) {
        for event in events {
            match event {
                Outbound::Broadcast(msg) => self.send_filtered(&msg, None),
                Outbound::BroadcastExcept(except, msg) => self.send_filtered(&msg, Some(except)),
                Outbound::To(id, msg) => {
                    if let Some(sender) = self.peers.get(&id) {
                        send(sender, &msg);
                    }
                }
            }
        }
    }

    fn send_filtered(&self, msg: &ServerMessage, except: Option<PlayerId>) {
        for (&id, sender) in &self.peers {
            if Some(id) != except {
                send(sender, msg);
            }
        }
    }
}

/// Serialize and send one message; closed channels are ignored.
fn send(sender: &PeerSender, msg: &ServerMessage) {
    match serde_json::to_string(msg) {
        Ok(text) => {
            let _ = sender.send(Message::Text(text));
        }
        Err(err) => warn!(%err, "failed to serialize outbound message"),
    }
}

/// A shared handle to one room's slot.
pub type SharedSlot = Arc<Mutex<RoomSlot>>;

struct RoomEntry {
    slot: SharedSlot,
    tick_task: JoinHandle<()>,
}

#[derive(Default)]
struct RegistryInner {
    rooms: HashMap<String, RoomEntry>,
    player_rooms: HashMap<PlayerId, String>,
}

/// Maps players to rooms and creates, discovers, and reaps rooms.
pub struct Registry {
    inner: Mutex<RegistryInner>,
    game_config: GameConfig,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(game_config: GameConfig) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            game_config,
        }
    }

    /// Number of live rooms.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.inner.lock().rooms.len()
    }

    /// Join a room and wire up the player's outbound channel.
    ///
    /// With an explicit code the room must exist and accept
    /// ([`GameError::RoomNotFound`] / [`GameError::RoomFull`] otherwise);
    /// without one, the first open waiting room is used, or a fresh room
    /// is created.
    pub fn join(
        &self,
        username: String,
        room_code: Option<String>,
        magnet_count: Option<usize>,
        sender: PeerSender,
    ) -> Result<(PlayerId, String)> {
        let (code, slot) = self.resolve_or_create(room_code)?;

        let mut guard = slot.lock();
        // Capacity may have changed since resolution; the room re-checks.
        let (player_id, mut events) = guard.room.join(username)?;
        guard.peers.insert(player_id, sender);
        if let Some(count) = magnet_count {
            events.extend(guard.room.set_magnet_count(player_id, count));
        }
        guard.fan_out(events);
        drop(guard);

        self.inner.lock().player_rooms.insert(player_id, code.clone());
        Ok((player_id, code))
    }

    /// Route a command from a joined player to their room.
    pub fn handle_command(&self, player_id: PlayerId, msg: ClientMessage) {
        let Some(slot) = self.slot_of(player_id) else {
            debug!(player = %player_id, "command from player without a room, ignored");
            return;
        };

        let mut guard = slot.lock();
        let events = match msg {
            ClientMessage::PlayerReady => guard.room.mark_ready(player_id),
            ClientMessage::PlaceMagnet { x, y } => guard.room.place_magnet(player_id, x, y),
            ClientMessage::SetMagnetCount { magnet_count } => {
                guard.room.set_magnet_count(player_id, magnet_count)
            }
            // A second join on a live connection is a protocol misuse.
            ClientMessage::Join { .. } => Vec::new(),
        };
        guard.fan_out(events);
    }

    /// Remove a disconnected player from their room.
    ///
    /// Returns the room code if the roster is now empty so the caller can
    /// schedule reaping.
    pub fn disconnect(&self, player_id: PlayerId) -> Option<String> {
        let code = self.inner.lock().player_rooms.remove(&player_id)?;
        let slot = {
            let inner = self.inner.lock();
            inner.rooms.get(&code)?.slot.clone()
        };

        let mut guard = slot.lock();
        guard.peers.remove(&player_id);
        let events = guard.room.remove_player(player_id);
        guard.fan_out(events);
        let emptied = guard.room.is_empty();
        drop(guard);

        emptied.then_some(code)
    }

    /// Delete a room if it is still empty (grace-period expiry).
    pub fn reap_if_empty(&self, code: &str) {
        let mut inner = self.inner.lock();
        let still_empty = inner
            .rooms
            .get(code)
            .is_some_and(|entry| entry.slot.lock().room.is_empty());
        if still_empty {
            if let Some(entry) = inner.rooms.remove(code) {
                entry.tick_task.abort();
                info!(room = code, "deleted empty room");
            }
        }
    }

    fn slot_of(&self, player_id: PlayerId) -> Option<SharedSlot> {
        let inner = self.inner.lock();
        let code = inner.player_rooms.get(&player_id)?;
        Some(inner.rooms.get(code)?.slot.clone())
    }

    fn resolve_or_create(&self, room_code: Option<String>) -> Result<(String, SharedSlot)> {
        let mut inner = self.inner.lock();

        if let Some(code) = room_code {
            // Explicit codes fail loudly rather than falling back.
            let entry = inner
                .rooms
                .get(&code)
                .ok_or_else(|| GameError::RoomNotFound(code.clone()))?;
            if !entry.slot.lock().room.can_accept() {
                return Err(GameError::RoomFull(code));
            }
            return Ok((code, entry.slot.clone()));
        }

        // Automatic assignment: any waiting room with a free seat.
        for (code, entry) in &inner.rooms {
            if entry.slot.lock().room.can_accept() {
                return Ok((code.clone(), entry.slot.clone()));
            }
        }

        Ok(Self::create_room_locked(&mut inner, self.game_config))
    }

    fn create_room_locked(
        inner: &mut RegistryInner,
        game_config: GameConfig,
    ) -> (String, SharedSlot) {
        let mut rng = rand::thread_rng();
        let mut code = generate_room_code(&mut rng);
        while inner.rooms.contains_key(&code) {
            code = generate_room_code(&mut rng);
        }

        let slot: SharedSlot = Arc::new(Mutex::new(RoomSlot {
            room: Room::new(code.clone(), game_config),
            peers: HashMap::new(),
        }));
        let tick_task = spawn_tick_loop(slot.clone(), game_config.tick_rate);
        inner.rooms.insert(
            code.clone(),
            RoomEntry {
                slot: slot.clone(),
                tick_task,
            },
        );
        info!(room = %code, "created room");
        (code, slot)
    }
}

/// Fixed-rate tick loop for one room. Runs until aborted at room
/// deletion; the slot lock is never held across an await.
fn spawn_tick_loop(slot: SharedSlot, tick_rate: u32) -> JoinHandle<()> {
    let period = Duration::from_micros(u64::from(1_000_000 / tick_rate.max(1)));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let mut guard = slot.lock();
            let events = guard.room.tick();
            guard.fan_out(events);
        }
    })
}

/// Schedule a grace-period deletion check for an emptied room.
pub fn spawn_room_reaper(registry: Arc<Registry>, code: String, grace: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        registry.reap_if_empty(&code);
    });
}

fn generate_room_code<R: Rng>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}
