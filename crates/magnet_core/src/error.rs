//! Error types for the game core.
//!
//! Only capacity and lookup failures are errors; rule violations (wrong
//! turn, invalid placement, wrong phase) are silent no-ops at the room
//! boundary and never surface here.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for room and registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// The room exists but cannot accept another player (at capacity or
    /// already past the waiting phase).
    #[error("Room {0} is full or already playing")]
    RoomFull(String),

    /// No live room carries the requested code.
    #[error("Room {0} not found")]
    RoomNotFound(String),

    /// The player is not a member of any room.
    #[error("Player is not in a room")]
    PlayerNotFound,
}
