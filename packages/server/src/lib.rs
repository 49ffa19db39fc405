//! Lobby and presence hub for a multiplayer typing game.
//!
//! Live lobby members talk over WebSocket, lobby browsers follow lobby
//! lifecycle events over Server-Sent Events.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
