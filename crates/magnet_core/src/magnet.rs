//! Players, magnets, and per-room magnet storage.
//!
//! Every magnet lives in one arena per room, keyed by a stable id. A
//! player's unplaced magnets are tracked as a stack of ids into that
//! arena; the stack length is the authoritative "remaining" count. The
//! `owner` field is the single source of ownership and is rewritten only
//! by settling resolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::math::Vec2;

/// Unique identifier for a connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a magnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MagnetId(pub Uuid);

impl MagnetId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for MagnetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A placeable, physically simulated piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Magnet {
    /// Stable identity.
    pub id: MagnetId,
    /// Current owner. Rewritten when settling reassigns a disturbed magnet.
    #[serde(rename = "playerId")]
    pub owner: PlayerId,
    /// Board position X (meaningful only while placed).
    pub x: f64,
    /// Board position Y (meaningful only while placed).
    pub y: f64,
    /// Velocity X.
    pub vx: f64,
    /// Velocity Y.
    pub vy: f64,
    /// Whether the magnet is on the board.
    pub is_placed: bool,
    /// Whether the magnet is the subject of an active settling window.
    pub is_settling: bool,
    /// Position X captured at placement time; cleared when unplaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_x: Option<f64>,
    /// Position Y captured at placement time; cleared when unplaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_y: Option<f64>,
}

impl Magnet {
    /// Create a fresh unplaced magnet owned by `owner`.
    #[must_use]
    pub fn new(owner: PlayerId) -> Self {
        Self {
            id: MagnetId::random(),
            owner,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            is_placed: false,
            is_settling: false,
            initial_x: None,
            initial_y: None,
        }
    }

    /// Current position as a vector.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Captured placement position, if the magnet is placed.
    #[must_use]
    pub fn initial_position(&self) -> Option<Vec2> {
        match (self.initial_x, self.initial_y) {
            (Some(x), Some(y)) => Some(Vec2::new(x, y)),
            _ => None,
        }
    }

    /// Put the magnet on the board at `point`, capturing it as the
    /// reference position for deviation checks.
    pub fn place_at(&mut self, point: Vec2) {
        self.x = point.x;
        self.y = point.y;
        self.initial_x = Some(point.x);
        self.initial_y = Some(point.y);
        self.is_placed = true;
        self.is_settling = true;
    }

    /// Take the magnet off the board and zero its physical state.
    pub fn unplace(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.vx = 0.0;
        self.vy = 0.0;
        self.is_placed = false;
        self.is_settling = false;
        self.initial_x = None;
        self.initial_y = None;
    }
}

/// A connected player inside one room.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Stable identity.
    pub id: PlayerId,
    /// Display name.
    pub username: String,
    /// Palette color assigned at join.
    pub color: String,
    /// LIFO stack of unplaced magnet ids; length is the remaining count.
    pub stack: Vec<MagnetId>,
    /// Ready flag, meaningful only in the waiting phase.
    pub is_ready: bool,
}

impl Player {
    /// Create a player with an empty stack.
    #[must_use]
    pub fn new(id: PlayerId, username: String, color: String) -> Self {
        Self {
            id,
            username,
            color,
            stack: Vec::new(),
            is_ready: false,
        }
    }

    /// Magnets left to place.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.stack.len()
    }
}

/// Storage for all magnets in one room.
///
/// Uses a `HashMap` for O(1) lookup by id, with sorted-id iteration when
/// order matters (pairwise force application, snapshots).
#[derive(Debug, Clone, Default)]
pub struct MagnetArena {
    magnets: HashMap<MagnetId, Magnet>,
}

impl MagnetArena {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a magnet, returning its id.
    pub fn insert(&mut self, magnet: Magnet) -> MagnetId {
        let id = magnet.id;
        self.magnets.insert(id, magnet);
        id
    }

    /// Remove a magnet by id.
    pub fn remove(&mut self, id: MagnetId) -> Option<Magnet> {
        self.magnets.remove(&id)
    }

    /// Get a magnet by id.
    #[must_use]
    pub fn get(&self, id: MagnetId) -> Option<&Magnet> {
        self.magnets.get(&id)
    }

    /// Get a mutable reference to a magnet by id.
    pub fn get_mut(&mut self, id: MagnetId) -> Option<&mut Magnet> {
        self.magnets.get_mut(&id)
    }

    /// Number of magnets in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.magnets.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.magnets.is_empty()
    }

    /// Ids of all placed magnets, sorted for stable iteration.
    #[must_use]
    pub fn placed_ids(&self) -> Vec<MagnetId> {
        let mut ids: Vec<_> = self
            .magnets
            .values()
            .filter(|m| m.is_placed)
            .map(|m| m.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of every magnet owned by `owner`.
    #[must_use]
    pub fn owned_by(&self, owner: PlayerId) -> Vec<MagnetId> {
        self.magnets
            .values()
            .filter(|m| m.owner == owner)
            .map(|m| m.id)
            .collect()
    }

    /// Remove every magnet owned by `owner` (used on disconnect).
    pub fn remove_owned_by(&mut self, owner: PlayerId) {
        self.magnets.retain(|_, m| m.owner != owner);
    }

    /// Iterate over all magnets (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Magnet> {
        self.magnets.values()
    }

    /// All magnets in sorted-id order (snapshot serialization).
    #[must_use]
    pub fn sorted(&self) -> Vec<&Magnet> {
        let mut all: Vec<_> = self.magnets.values().collect();
        all.sort_unstable_by_key(|m| m.id);
        all
    }
}
