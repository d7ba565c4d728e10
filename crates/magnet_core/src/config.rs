//! Game tuning constants.
//!
//! All physics and rule constants live in [`GameConfig`] so tests can run
//! rooms with a shrunk settling window instead of waiting out real time.
//! The defaults are the shipped game balance.

use serde::{Deserialize, Serialize};

/// Ticks per second for every room's simulation loop.
pub const TICK_RATE: u32 = 60;

/// Player colors, assigned round-robin in join order per room.
pub const PLAYER_COLORS: [&str; 8] = [
    "#3B82F6", // Blue
    "#EF4444", // Red
    "#10B981", // Green
    "#F59E0B", // Amber
    "#8B5CF6", // Purple
    "#EC4899", // Pink
    "#14B8A6", // Teal
    "#F97316", // Orange
];

/// Room-code alphabet. Excludes 0/O/1/I so codes survive being read aloud.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of generated room codes.
pub const ROOM_CODE_LEN: usize = 6;

/// Playfield dimensions, fixed for every room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldBounds {
    /// Width in world units.
    pub width: f64,
    /// Height in world units.
    pub height: f64,
}

/// Tuning constants for one room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    /// Playfield size.
    pub world_bounds: WorldBounds,
    /// Physical radius of a magnet, used for wall and overlap checks.
    pub magnet_radius: f64,
    /// Speed cap; velocities above this are rescaled down to it.
    pub max_velocity: f64,
    /// Per-tick velocity multiplier (exponential decay, not real friction).
    pub damping: f64,
    /// The `k` in the attraction law `k / d^2`.
    pub magnetic_strength: f64,
    /// Below this separation no force applies (prevents singular forces).
    pub min_force_distance: f64,
    /// Beyond this separation no force applies.
    pub max_force_distance: f64,
    /// Displacement from the captured placement position that counts as
    /// "disturbed".
    pub movement_threshold: f64,
    /// Velocity components below this snap to exactly zero.
    pub stop_epsilon: f64,
    /// Per-component speed under which a magnet counts as still for early
    /// settling resolution.
    pub stillness_epsilon: f64,
    /// Maximum players per room; the game starts only at exactly this count.
    pub max_players: usize,
    /// Default magnets dealt to each player.
    pub default_magnet_count: usize,
    /// Smallest configurable per-player magnet count.
    pub min_magnet_count: usize,
    /// Largest configurable per-player magnet count.
    pub max_magnet_count: usize,
    /// Full settling window in milliseconds.
    pub settle_duration_ms: u64,
    /// Minimum time before "everything is still" may resolve settling.
    pub settle_grace_ms: u64,
    /// Room tick rate in Hz.
    pub tick_rate: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_bounds: WorldBounds {
                width: 1200.0,
                height: 800.0,
            },
            magnet_radius: 12.0,
            max_velocity: 8.0,
            damping: 0.95,
            magnetic_strength: 3000.0,
            min_force_distance: 26.0,
            max_force_distance: 280.0,
            movement_threshold: 3.0,
            stop_epsilon: 0.01,
            stillness_epsilon: 0.1,
            max_players: 2,
            default_magnet_count: 8,
            min_magnet_count: 3,
            max_magnet_count: 15,
            settle_duration_ms: 3000,
            settle_grace_ms: 500,
            tick_rate: TICK_RATE,
        }
    }
}

impl GameConfig {
    /// Number of room ticks covering `ms` milliseconds at this config's
    /// tick rate, rounded up so short windows never collapse to zero.
    #[must_use]
    pub fn ms_to_ticks(&self, ms: u64) -> u64 {
        (ms * u64::from(self.tick_rate)).div_ceil(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_consistent() {
        let config = GameConfig::default();
        assert!(config.min_magnet_count <= config.default_magnet_count);
        assert!(config.default_magnet_count <= config.max_magnet_count);
        assert!(config.min_force_distance < config.max_force_distance);
        assert!(config.damping < 1.0);
        assert!(config.settle_grace_ms < config.settle_duration_ms);
    }

    #[test]
    fn test_ms_to_ticks_rounds_up() {
        let config = GameConfig::default();
        // 60 Hz: 100ms = 6 ticks, 3000ms = 180 ticks.
        assert_eq!(config.ms_to_ticks(100), 6);
        assert_eq!(config.ms_to_ticks(3000), 180);
        // 1ms is less than one tick but must still take a tick.
        assert_eq!(config.ms_to_ticks(1), 1);
    }
}
