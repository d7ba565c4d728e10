//! The room state machine.
//!
//! A [`Room`] is one isolated game: its roster, its magnet arena, its
//! turn order, its phase, and its in-flight settling window. Every
//! mutation returns the [`Outbound`] messages it produced; the server
//! crate owns delivery. Rule violations are silent no-ops per the error
//! taxonomy - the only feedback is the unchanged next snapshot.
//!
//! # Settling
//!
//! Placement starts a bounded observation window. It is evaluated once
//! per room tick (not on a separate timer): the window resolves when the
//! full budget elapses, or early once every placed magnet is still and a
//! minimum grace period has passed. If any *other* magnet deviated beyond
//! the movement threshold, the placement is reverted and every disturbed
//! magnet changes owner to the acting player - the one mutable-ownership
//! path in the model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{GameConfig, PLAYER_COLORS};
use crate::error::{GameError, Result};
use crate::magnet::{Magnet, MagnetArena, MagnetId, Player, PlayerId};
use crate::math::Vec2;
use crate::physics::PhysicsEngine;
use crate::protocol::{GameSnapshot, Outbound, PlayerView, ServerMessage};

/// Room lifecycle phase. Transitions are monotonic:
/// `waiting -> playing -> finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Pre-game: joining, readiness, configuration.
    Waiting,
    /// Turns active, physics running.
    Playing,
    /// Winner decided; commands have no effect.
    Finished,
}

/// An in-flight post-placement observation window.
#[derive(Debug, Clone, Copy)]
struct Settling {
    placed_magnet: MagnetId,
    acting_player: PlayerId,
    started_tick: u64,
}

/// One isolated, independently ticking game instance.
#[derive(Debug)]
pub struct Room {
    code: String,
    config: GameConfig,
    physics: PhysicsEngine,
    players: HashMap<PlayerId, Player>,
    /// Join order; doubles as the round-robin turn order.
    player_order: Vec<PlayerId>,
    magnets: MagnetArena,
    phase: GamePhase,
    current_turn: Option<PlayerId>,
    winner: Option<PlayerId>,
    magnet_count: usize,
    color_index: usize,
    tick: u64,
    settling: Option<Settling>,
}

impl Room {
    /// Create an empty waiting room with the given code.
    #[must_use]
    pub fn new(code: String, config: GameConfig) -> Self {
        Self {
            code,
            physics: PhysicsEngine::new(config),
            players: HashMap::new(),
            player_order: Vec::new(),
            magnets: MagnetArena::new(),
            phase: GamePhase::Waiting,
            current_turn: None,
            winner: None,
            magnet_count: config.default_magnet_count,
            color_index: 0,
            tick: 0,
            settling: None,
            config,
        }
    }

    /// The room's join code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Number of players in the roster.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whether the roster is empty (candidate for grace-period deletion).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Whether a new player may join right now.
    #[must_use]
    pub fn can_accept(&self) -> bool {
        self.phase == GamePhase::Waiting && self.players.len() < self.config.max_players
    }

    /// Whose turn it is, if the game is running.
    #[must_use]
    pub fn current_turn(&self) -> Option<PlayerId> {
        self.current_turn
    }

    /// The winner, once the game is finished.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Read access to the magnet arena (tests, diagnostics).
    #[must_use]
    pub fn magnets(&self) -> &MagnetArena {
        &self.magnets
    }

    /// Look up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Add a player to the roster.
    ///
    /// Fails with [`GameError::RoomFull`] when the room is at capacity or
    /// past the waiting phase. On success the joiner gets `welcome` and
    /// everyone else gets `player_joined`.
    pub fn join(&mut self, username: String) -> Result<(PlayerId, Vec<Outbound>)> {
        if !self.can_accept() {
            return Err(GameError::RoomFull(self.code.clone()));
        }

        let id = PlayerId::random();
        let color = PLAYER_COLORS[self.color_index % PLAYER_COLORS.len()].to_string();
        self.color_index += 1;

        let player = Player::new(id, username, color);
        let view = PlayerView::from(&player);
        self.players.insert(id, player);
        self.player_order.push(id);

        info!(room = %self.code, player = %id, "player joined");

        let events = vec![
            Outbound::To(
                id,
                ServerMessage::Welcome {
                    player_id: id,
                    room_code: self.code.clone(),
                    state: self.snapshot(),
                },
            ),
            Outbound::BroadcastExcept(id, ServerMessage::PlayerJoined { player: view }),
        ];
        Ok((id, events))
    }

    /// Change the per-player magnet count. Best-effort config: ignored
    /// outside the waiting phase or outside the legal range.
    pub fn set_magnet_count(&mut self, player_id: PlayerId, count: usize) -> Vec<Outbound> {
        if self.phase != GamePhase::Waiting || !self.players.contains_key(&player_id) {
            return Vec::new();
        }
        if count < self.config.min_magnet_count || count > self.config.max_magnet_count {
            debug!(room = %self.code, count, "magnet count out of range, ignored");
            return Vec::new();
        }

        self.magnet_count = count;
        debug!(room = %self.code, count, "magnet count updated");
        vec![Outbound::Broadcast(ServerMessage::GameState {
            state: self.snapshot(),
        })]
    }

    /// Mark a player ready. When the roster is exactly at capacity and
    /// everyone is ready, the game starts: stacks are dealt and the first
    /// joiner takes the first turn.
    pub fn mark_ready(&mut self, player_id: PlayerId) -> Vec<Outbound> {
        if self.phase != GamePhase::Waiting {
            return Vec::new();
        }
        let Some(player) = self.players.get_mut(&player_id) else {
            return Vec::new();
        };
        player.is_ready = true;

        let mut events = Vec::new();
        let full_roster = self.players.len() == self.config.max_players;
        if full_roster && self.players.values().all(|p| p.is_ready) {
            self.start_game();
            events.push(Outbound::Broadcast(ServerMessage::GameStarted));
        }

        events.push(Outbound::Broadcast(ServerMessage::GameState {
            state: self.snapshot(),
        }));
        events
    }

    fn start_game(&mut self) {
        self.phase = GamePhase::Playing;

        // Deal each player a stack of fresh unplaced magnets.
        for &player_id in &self.player_order {
            let Some(player) = self.players.get_mut(&player_id) else {
                continue;
            };
            for _ in 0..self.magnet_count {
                let id = self.magnets.insert(Magnet::new(player_id));
                player.stack.push(id);
            }
        }

        self.current_turn = self.player_order.first().copied();
        info!(
            room = %self.code,
            magnets = self.magnet_count,
            "game started"
        );
    }

    /// Place a magnet for `player_id` at `(x, y)`.
    ///
    /// Ignored unless the game is running, it is the sender's turn, no
    /// settling window is already open, the sender's stack is non-empty,
    /// and the position passes placement validation. A successful
    /// placement opens the settling window; the turn advances only when
    /// it resolves.
    pub fn place_magnet(&mut self, player_id: PlayerId, x: f64, y: f64) -> Vec<Outbound> {
        if self.phase != GamePhase::Playing
            || self.current_turn != Some(player_id)
            || self.settling.is_some()
        {
            debug!(room = %self.code, player = %player_id, "placement out of turn, ignored");
            return Vec::new();
        }

        let point = Vec2::new(x, y);
        if !self.physics.is_valid_placement(point, &self.magnets) {
            debug!(room = %self.code, x, y, "invalid placement, ignored");
            return Vec::new();
        }

        let Some(player) = self.players.get_mut(&player_id) else {
            return Vec::new();
        };
        let Some(magnet_id) = player.stack.pop() else {
            debug!(room = %self.code, player = %player_id, "empty stack, ignored");
            return Vec::new();
        };

        if let Some(magnet) = self.magnets.get_mut(magnet_id) {
            magnet.place_at(point);
        }

        self.settling = Some(Settling {
            placed_magnet: magnet_id,
            acting_player: player_id,
            started_tick: self.tick,
        });
        debug!(room = %self.code, player = %player_id, magnet = %magnet_id, x, y, "magnet placed");
        Vec::new()
    }

    /// Remove a player and every magnet they own.
    ///
    /// Repairs the turn pointer if the leaver held it, drops an in-flight
    /// settling window that lost its actor or subject, and reports whether
    /// the roster is now empty so the caller can schedule deletion.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Vec<Outbound> {
        if self.players.remove(&player_id).is_none() {
            return Vec::new();
        }

        let former_index = self.player_order.iter().position(|&p| p == player_id);
        self.player_order.retain(|&p| p != player_id);
        self.magnets.remove_owned_by(player_id);

        // A settling window whose actor or placed magnet vanished has no
        // outcome to produce.
        if let Some(settling) = self.settling {
            if settling.acting_player == player_id
                || self.magnets.get(settling.placed_magnet).is_none()
            {
                self.settling = None;
            }
        }

        // Turn repair: pass to the player now occupying the leaver's
        // former slot, wrapping.
        if self.current_turn == Some(player_id) {
            self.current_turn = match (former_index, self.player_order.len()) {
                (_, 0) | (None, _) => None,
                (Some(index), len) => Some(self.player_order[index % len]),
            };
        }

        info!(room = %self.code, player = %player_id, "player left");
        vec![Outbound::Broadcast(ServerMessage::PlayerLeft { player_id })]
    }

    /// Advance the room by one tick: run physics while playing, evaluate
    /// an open settling window, and always emit a snapshot broadcast.
    pub fn tick(&mut self) -> Vec<Outbound> {
        self.tick += 1;
        let mut events = Vec::new();

        if self.phase == GamePhase::Playing {
            self.physics.step(&mut self.magnets);
            events.extend(self.poll_settling());
        }

        events.push(Outbound::Broadcast(ServerMessage::GameState {
            state: self.snapshot(),
        }));
        events
    }

    /// Evaluate the settling window, resolving it when the budget elapses
    /// or everything has come to rest past the grace period.
    fn poll_settling(&mut self) -> Vec<Outbound> {
        let Some(settling) = self.settling else {
            return Vec::new();
        };

        // Guard against a window orphaned by a disconnect.
        if !self.players.contains_key(&settling.acting_player)
            || self.magnets.get(settling.placed_magnet).is_none()
        {
            self.settling = None;
            return Vec::new();
        }

        let elapsed = self.tick - settling.started_tick;
        let budget = self.config.ms_to_ticks(self.config.settle_duration_ms);
        let grace = self.config.ms_to_ticks(self.config.settle_grace_ms);

        let eps = self.config.stillness_epsilon;
        let all_still = self
            .magnets
            .iter()
            .filter(|m| m.is_placed)
            .all(|m| m.vx.abs() < eps && m.vy.abs() < eps);

        if elapsed >= budget || (all_still && elapsed > grace) {
            self.settling = None;
            self.resolve_settling(settling)
        } else {
            Vec::new()
        }
    }

    /// Ids of placed magnets (other than `exclude`) that deviated beyond
    /// the movement threshold from their captured placement position.
    fn deviated_magnets(&self, exclude: MagnetId) -> Vec<MagnetId> {
        let mut moved: Vec<_> = self
            .magnets
            .iter()
            .filter(|m| m.is_placed && m.id != exclude)
            .filter(|m| {
                m.initial_position().is_some_and(|initial| {
                    m.position().distance(initial) > self.config.movement_threshold
                })
            })
            .map(|m| m.id)
            .collect();
        moved.sort_unstable();
        moved
    }

    fn resolve_settling(&mut self, settling: Settling) -> Vec<Outbound> {
        let mut events = Vec::new();
        let moved = self.deviated_magnets(settling.placed_magnet);

        if let Some(magnet) = self.magnets.get_mut(settling.placed_magnet) {
            magnet.is_settling = false;
        }

        if !moved.is_empty() {
            // The placement failed to stay: the placed magnet returns to
            // the actor's stack, and every disturbed magnet changes owner
            // to the actor and joins that stack too.
            if let Some(magnet) = self.magnets.get_mut(settling.placed_magnet) {
                magnet.unplace();
            }
            if let Some(actor) = self.players.get_mut(&settling.acting_player) {
                actor.stack.push(settling.placed_magnet);
            }

            for &id in &moved {
                let Some(magnet) = self.magnets.get_mut(id) else {
                    continue;
                };
                magnet.unplace();
                magnet.owner = settling.acting_player;
                if let Some(actor) = self.players.get_mut(&settling.acting_player) {
                    actor.stack.push(id);
                }
            }

            info!(
                room = %self.code,
                disturbed = moved.len(),
                "placement reverted, disturbed magnets reassigned"
            );
            events.push(Outbound::Broadcast(ServerMessage::MagnetsMoved {
                moved_magnets: moved,
            }));
        }

        // Win check: the acting player emptied their stack.
        let actor_remaining = self
            .players
            .get(&settling.acting_player)
            .map_or(0, Player::remaining);
        if actor_remaining == 0 {
            self.phase = GamePhase::Finished;
            self.winner = Some(settling.acting_player);
            self.current_turn = None;
            info!(room = %self.code, winner = %settling.acting_player, "game over");
            if let Some(winner) = self.players.get(&settling.acting_player) {
                events.push(Outbound::Broadcast(ServerMessage::GameOver {
                    winner: PlayerView::from(winner),
                }));
            }
            return events;
        }

        self.advance_turn(settling.acting_player);
        events
    }

    /// Round-robin turn advance from `from`, restarting from the first
    /// joiner when `from` is no longer in the order.
    fn advance_turn(&mut self, from: PlayerId) {
        if self.player_order.is_empty() {
            self.current_turn = None;
            return;
        }
        let next = match self.player_order.iter().position(|&p| p == from) {
            Some(index) => (index + 1) % self.player_order.len(),
            None => 0,
        };
        self.current_turn = Some(self.player_order[next]);
    }

    /// Serialize the full authoritative state for clients.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self
                .players
                .iter()
                .map(|(&id, player)| (id, PlayerView::from(player)))
                .collect(),
            magnets: self.magnets.sorted().into_iter().cloned().collect(),
            current_turn: self.current_turn,
            game_phase: self.phase,
            winner: self.winner,
            magnet_count: self.magnet_count,
            world_bounds: self.config.world_bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_room() -> Room {
        Room::new("TEST42".to_string(), GameConfig::default())
    }

    fn join_two(room: &mut Room) -> (PlayerId, PlayerId) {
        let (p1, _) = room.join("alice".into()).unwrap();
        let (p2, _) = room.join("bob".into()).unwrap();
        (p1, p2)
    }

    fn start_game(room: &mut Room) -> (PlayerId, PlayerId) {
        let (p1, p2) = join_two(room);
        room.mark_ready(p1);
        room.mark_ready(p2);
        (p1, p2)
    }

    /// Sum of stacks plus placed-and-owned magnets, per the conservation
    /// invariant.
    fn total_magnets(room: &Room) -> usize {
        room.magnets().len()
    }

    #[test]
    fn test_join_assigns_distinct_colors_and_order() {
        let mut room = new_room();
        let (p1, events) = room.join("alice".into()).unwrap();
        assert!(matches!(
            events[0],
            Outbound::To(id, ServerMessage::Welcome { .. }) if id == p1
        ));

        let (p2, _) = room.join("bob".into()).unwrap();
        assert_ne!(room.player(p1).unwrap().color, room.player(p2).unwrap().color);
    }

    #[test]
    fn test_join_full_room_fails() {
        let mut room = new_room();
        join_two(&mut room);
        assert_eq!(
            room.join("carol".into()),
            Err(GameError::RoomFull("TEST42".into()))
        );
    }

    #[test]
    fn test_join_after_start_fails() {
        let mut room = new_room();
        start_game(&mut room);
        assert!(room.join("carol".into()).is_err());
    }

    #[test]
    fn test_set_magnet_count_range_and_phase_gates() {
        let mut room = new_room();
        let (p1, _) = room.join("alice".into()).unwrap();

        assert!(room.set_magnet_count(p1, 100).is_empty());
        assert!(room.set_magnet_count(p1, 2).is_empty());
        assert!(!room.set_magnet_count(p1, 5).is_empty());
        assert_eq!(room.snapshot().magnet_count, 5);

        let (p2, _) = room.join("bob".into()).unwrap();
        room.mark_ready(p1);
        room.mark_ready(p2);
        assert!(room.set_magnet_count(p1, 10).is_empty());
        assert_eq!(room.snapshot().magnet_count, 5);
    }

    #[test]
    fn test_game_starts_only_when_full_roster_ready() {
        let mut room = new_room();
        let (p1, _) = room.join("alice".into()).unwrap();
        room.mark_ready(p1);
        // One ready player in a one-player room is not enough.
        assert_eq!(room.phase(), GamePhase::Waiting);

        let (p2, _) = room.join("bob".into()).unwrap();
        let events = room.mark_ready(p2);
        assert_eq!(room.phase(), GamePhase::Playing);
        assert!(events
            .iter()
            .any(|e| matches!(e, Outbound::Broadcast(ServerMessage::GameStarted))));

        // First joiner takes the first turn; both stacks are dealt.
        assert_eq!(room.current_turn(), Some(p1));
        assert_eq!(room.player(p1).unwrap().remaining(), 8);
        assert_eq!(room.player(p2).unwrap().remaining(), 8);
        assert_eq!(total_magnets(&room), 16);
    }

    #[test]
    fn test_place_magnet_guards() {
        let mut room = new_room();
        let (p1, p2) = start_game(&mut room);

        // Not p2's turn.
        room.place_magnet(p2, 400.0, 400.0);
        assert_eq!(room.player(p2).unwrap().remaining(), 8);

        // Out of bounds is ignored.
        room.place_magnet(p1, -5.0, 400.0);
        assert_eq!(room.player(p1).unwrap().remaining(), 8);

        // Valid placement pops the stack and opens settling.
        room.place_magnet(p1, 400.0, 400.0);
        assert_eq!(room.player(p1).unwrap().remaining(), 7);

        // Second placement while settling is ignored.
        room.place_magnet(p1, 700.0, 400.0);
        assert_eq!(room.player(p1).unwrap().remaining(), 7);
    }

    #[test]
    fn test_quiet_settle_keeps_placement_and_advances_turn() {
        let mut room = new_room();
        let (p1, p2) = start_game(&mut room);

        room.place_magnet(p1, 200.0, 200.0);
        // Nothing nearby: resolves early on stillness after the grace
        // period. Tick well past the full budget to be safe.
        for _ in 0..200 {
            room.tick();
            if room.current_turn() == Some(p2) {
                break;
            }
        }

        assert_eq!(room.current_turn(), Some(p2));
        assert_eq!(room.player(p1).unwrap().remaining(), 7);
        let placed: Vec<_> = room.magnets().placed_ids();
        assert_eq!(placed.len(), 1);
        assert!(!room.magnets().get(placed[0]).unwrap().is_settling);
    }

    #[test]
    fn test_disturbing_settle_reverts_and_reassigns() {
        let mut room = new_room();
        let (p1, p2) = start_game(&mut room);

        // p1 places far from everything; settles quietly.
        room.place_magnet(p1, 200.0, 200.0);
        while room.current_turn() != Some(p2) {
            room.tick();
        }
        // p2 places far away too.
        room.place_magnet(p2, 900.0, 600.0);
        while room.current_turn() != Some(p1) {
            room.tick();
        }
        let p2_magnet = room
            .magnets()
            .placed_ids()
            .into_iter()
            .find(|&id| room.magnets().get(id).unwrap().owner == p2)
            .unwrap();

        let before = room.player(p1).unwrap().remaining();

        // p1 places inside the force band of p2's magnet: it gets pulled
        // past the movement threshold during settling.
        room.place_magnet(p1, 950.0, 600.0);
        let mut saw_moved = false;
        for _ in 0..400 {
            let events = room.tick();
            if events.iter().any(|e| {
                matches!(e, Outbound::Broadcast(ServerMessage::MagnetsMoved { .. }))
            }) {
                saw_moved = true;
            }
            if room.current_turn() == Some(p2) {
                break;
            }
        }

        assert!(saw_moved);
        // The placement came back plus the disturbed magnet: net +1.
        assert_eq!(room.player(p1).unwrap().remaining(), before + 1);
        // The disturbed magnet now belongs to p1.
        assert_eq!(room.magnets().get(p2_magnet).unwrap().owner, p1);
        assert!(!room.magnets().get(p2_magnet).unwrap().is_placed);
        // Turn advanced regardless of the outcome.
        assert_eq!(room.current_turn(), Some(p2));
        // Conservation: nothing created or destroyed.
        assert_eq!(total_magnets(&room), 16);
    }

    #[test]
    fn test_stack_conservation_through_play() {
        let mut room = new_room();
        let (p1, p2) = start_game(&mut room);
        let expected = 16;

        let spots = [(100.0, 100.0), (1100.0, 700.0), (100.0, 700.0), (1100.0, 100.0)];
        let mut turn_holders = [p1, p2, p1, p2].into_iter();
        for (x, y) in spots {
            let actor = turn_holders.next().unwrap();
            room.place_magnet(actor, x, y);
            for _ in 0..400 {
                room.tick();
                let stacked: usize = [p1, p2]
                    .iter()
                    .map(|&p| room.player(p).unwrap().remaining())
                    .sum();
                let placed = room.magnets().placed_ids().len();
                // The in-flight magnet is on the board, so stacks plus the
                // board always account for every magnet.
                assert_eq!(stacked + placed, expected);
                assert_eq!(total_magnets(&room), expected);
                if room.current_turn() != Some(actor) {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_win_on_empty_stack() {
        let config = GameConfig {
            min_magnet_count: 1,
            default_magnet_count: 1,
            ..GameConfig::default()
        };
        let mut room = Room::new("WINNER".into(), config);
        let (p1, p2) = (
            room.join("alice".into()).unwrap().0,
            room.join("bob".into()).unwrap().0,
        );
        room.mark_ready(p1);
        room.mark_ready(p2);
        assert_eq!(room.player(p1).unwrap().remaining(), 1);

        room.place_magnet(p1, 200.0, 200.0);
        let mut saw_game_over = false;
        for _ in 0..400 {
            let events = room.tick();
            if events.iter().any(|e| {
                matches!(e, Outbound::Broadcast(ServerMessage::GameOver { .. }))
            }) {
                saw_game_over = true;
                break;
            }
        }

        assert!(saw_game_over);
        assert_eq!(room.phase(), GamePhase::Finished);
        assert_eq!(room.winner(), Some(p1));

        // No further placements have any effect.
        room.place_magnet(p2, 600.0, 600.0);
        assert_eq!(room.player(p2).unwrap().remaining(), 1);
    }

    #[test]
    fn test_disconnect_removes_magnets_and_repairs_turn() {
        let mut room = new_room();
        let (p1, p2) = start_game(&mut room);

        room.place_magnet(p1, 200.0, 200.0);
        while room.current_turn() != Some(p2) {
            room.tick();
        }

        // p2 leaves while holding the turn.
        let events = room.remove_player(p2);
        assert!(matches!(
            events[0],
            Outbound::Broadcast(ServerMessage::PlayerLeft { player_id }) if player_id == p2
        ));
        // Turn passed to the player in the leaver's former slot (wrapped).
        assert_eq!(room.current_turn(), Some(p1));
        // All of p2's magnets are gone; p1's placed magnet survived.
        assert_eq!(total_magnets(&room), 8);
        assert_eq!(room.magnets().placed_ids().len(), 1);
    }

    #[test]
    fn test_disconnect_of_actor_aborts_settling() {
        let mut room = new_room();
        let (p1, p2) = start_game(&mut room);

        room.place_magnet(p1, 200.0, 200.0);
        room.remove_player(p1);
        assert!(room.settling.is_none());

        // The room keeps ticking without producing a settling outcome.
        let events = room.tick();
        assert!(events.iter().all(|e| !matches!(
            e,
            Outbound::Broadcast(ServerMessage::MagnetsMoved { .. })
        )));
        assert_eq!(room.current_turn(), Some(p2));
    }

    #[test]
    fn test_remove_last_player_empties_room() {
        let mut room = new_room();
        let (p1, _) = room.join("alice".into()).unwrap();
        room.remove_player(p1);
        assert!(room.is_empty());
        assert_eq!(room.current_turn(), None);
    }

    #[test]
    fn test_snapshot_shape() {
        let mut room = new_room();
        let (p1, p2) = start_game(&mut room);

        let snapshot = room.snapshot();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.game_phase, GamePhase::Playing);
        assert_eq!(snapshot.current_turn, Some(p1));
        assert_eq!(snapshot.winner, None);
        assert_eq!(snapshot.magnets.len(), 16);
        assert_eq!(snapshot.players[&p2].magnets_remaining, 8);
        assert!((snapshot.world_bounds.width - 1200.0).abs() < f64::EPSILON);
    }
}
