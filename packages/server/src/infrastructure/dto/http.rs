//! HTTP API DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lobby as exposed over HTTP, SSE and inside the update envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbyDto {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub is_public: bool,
    pub has_password: bool,
    pub status: String,
    pub max_players: usize,
    pub is_open: bool,
    pub players: Vec<Uuid>,
    /// RFC 3339 (UTC)
    pub created_at: String,
    /// RFC 3339 (UTC)
    pub updated_at: String,
}

/// Request body of `POST /api/v1/lobbies`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLobbyRequest {
    pub name: String,
    pub is_public: bool,
    #[serde(default)]
    pub password: Option<String>,
    pub max_players: i64,
}

/// Request body of `POST /api/v1/lobbies/{id}/join`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinLobbyRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// JSON envelope of every HTTP API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
