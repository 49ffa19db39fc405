//! SSE DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{Lobby, LobbyUpdateKind};

use super::http::LobbyDto;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyUpdateType {
    LobbyCreated,
    LobbyUpdated,
    LobbyDeleted,
}

/// `{ "type": "lobby_created" | "lobby_updated" | "lobby_deleted", "lobby": Lobby }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbyUpdateMessage {
    pub r#type: LobbyUpdateType,
    pub lobby: LobbyDto,
}

impl LobbyUpdateMessage {
    pub fn new(kind: LobbyUpdateKind, lobby: &Lobby) -> Self {
        Self {
            r#type: kind.into(),
            lobby: lobby.into(),
        }
    }
}
