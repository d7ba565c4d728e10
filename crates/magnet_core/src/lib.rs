//! # Magnet Arena Core
//!
//! Authoritative game logic for the Magnet Arena multiplayer server.
//!
//! This crate contains **only** in-memory game logic:
//! - No networking
//! - No async runtime
//! - No IO
//!
//! The separation keeps the room state machine and the physics engine
//! testable by direct calls (tick the room, inspect the result) while the
//! server crate owns sockets, timers and fan-out.
//!
//! ## Crate Structure
//!
//! - [`config`] - Tuning constants and the color palette
//! - [`magnet`] - Players, magnets, and the per-room magnet arena
//! - [`physics`] - Pairwise attraction simulation and placement validation
//! - [`protocol`] - Wire message and snapshot types
//! - [`room`] - The room state machine: turns, settling, win check

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod magnet;
pub mod math;
pub mod physics;
pub mod protocol;
pub mod room;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{GameConfig, WorldBounds, PLAYER_COLORS, ROOM_CODE_ALPHABET};
    pub use crate::error::{GameError, Result};
    pub use crate::magnet::{Magnet, MagnetArena, MagnetId, Player, PlayerId};
    pub use crate::math::Vec2;
    pub use crate::physics::PhysicsEngine;
    pub use crate::protocol::{ClientMessage, GameSnapshot, Outbound, ServerMessage};
    pub use crate::room::{GamePhase, Room};
}
