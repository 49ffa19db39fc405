//! Conversion logic between DTOs and domain entities.

use raceway_shared::time::timestamp_to_rfc3339;

use crate::domain::{Lobby, LobbyUpdateKind};

use super::{http::LobbyDto, sse::LobbyUpdateType};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Lobby> for LobbyDto {
    fn from(lobby: &Lobby) -> Self {
        Self {
            id: *lobby.id.as_uuid(),
            name: lobby.name.as_str().to_string(),
            owner_id: *lobby.owner_id.as_uuid(),
            is_public: lobby.is_public,
            has_password: lobby.requires_password(),
            status: lobby.status.as_str().to_string(),
            max_players: lobby.max_players.value(),
            is_open: lobby.is_open,
            players: lobby.players.iter().map(|id| *id.as_uuid()).collect(),
            created_at: timestamp_to_rfc3339(lobby.created_at.value()),
            updated_at: timestamp_to_rfc3339(lobby.updated_at.value()),
        }
    }
}

impl From<LobbyUpdateKind> for LobbyUpdateType {
    fn from(kind: LobbyUpdateKind) -> Self {
        match kind {
            LobbyUpdateKind::Created => Self::LobbyCreated,
            LobbyUpdateKind::Updated => Self::LobbyUpdated,
            LobbyUpdateKind::Deleted => Self::LobbyDeleted,
        }
    }
}
