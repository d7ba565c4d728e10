//! # Magnet Arena Server
//!
//! WebSocket front for the Magnet Arena game.
//!
//! Owns everything the core does not: sockets, per-room tick tasks,
//! matchmaking, and best-effort broadcast fan-out. All game rules live in
//! `magnet_core`; this crate only routes commands in and messages out.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

use std::time::Duration;

pub mod connection;
pub mod registry;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// How long an emptied room survives before deletion.
    pub empty_room_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            empty_room_grace: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Build a config from the environment (`PORT`), falling back to
    /// defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(port) = std::env::var("PORT").ok().and_then(|s| s.parse().ok()) {
            config.port = port;
        }
        config
    }
}
