//! Entities.

use std::fmt;

use super::{
    error::LobbyError,
    value_object::{LobbyId, LobbyName, MaxPlayers, Timestamp, UserId},
};

/// Lobby lifecycle status.
///
/// `Active → InProgress → Closed`, `Active → Closed`, and any non-deleted
/// status → `Deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LobbyStatus {
    Active,
    InProgress,
    Closed,
    Deleted,
}

impl LobbyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
            Self::Deleted => "deleted",
        }
    }

    fn can_transition_to(self, next: LobbyStatus) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::InProgress)
                | (Self::Active, Self::Closed)
                | (Self::InProgress, Self::Closed)
                | (Self::Active, Self::Deleted)
                | (Self::InProgress, Self::Deleted)
                | (Self::Closed, Self::Deleted)
        )
    }
}

impl fmt::Display for LobbyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A game room.
///
/// `players` is the persisted membership. Live WebSocket connections are
/// tracked separately by the lobby registry and may be a subset of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lobby {
    pub id: LobbyId,
    pub name: LobbyName,
    pub owner_id: UserId,
    pub is_public: bool,
    /// PHC string, only for private lobbies with a password
    pub password_hash: Option<String>,
    pub max_players: MaxPlayers,
    pub status: LobbyStatus,
    pub is_open: bool,
    pub players: Vec<UserId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lobby {
    /// Create a lobby whose only member is its owner.
    pub fn new(
        id: LobbyId,
        name: LobbyName,
        owner_id: UserId,
        is_public: bool,
        password_hash: Option<String>,
        max_players: MaxPlayers,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            owner_id,
            is_public,
            password_hash,
            max_players,
            status: LobbyStatus::Active,
            is_open: true,
            players: vec![owner_id],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.players.contains(user_id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players.value()
    }

    pub fn requires_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Listed by the "open lobbies" query.
    pub fn is_joinable_publicly(&self) -> bool {
        self.is_public && self.is_open && self.status == LobbyStatus::Active
    }

    /// Add a player. Joining a lobby one already belongs to is a no-op.
    pub fn add_player(&mut self, user_id: UserId, now: Timestamp) -> Result<(), LobbyError> {
        if self.is_member(&user_id) {
            return Ok(());
        }
        if !self.is_open || self.status != LobbyStatus::Active {
            return Err(LobbyError::NotOpen);
        }
        if self.is_full() {
            return Err(LobbyError::Full(self.max_players.value()));
        }
        self.players.push(user_id);
        self.updated_at = now;
        Ok(())
    }

    /// Remove a player, returning whether they were a member.
    pub fn remove_player(&mut self, user_id: &UserId, now: Timestamp) -> bool {
        let before = self.players.len();
        self.players.retain(|id| id != user_id);
        let removed = self.players.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }

    /// Move the lobby to `next`. A lobby stops accepting players once it
    /// leaves `Active`.
    pub fn transition_to(&mut self, next: LobbyStatus, now: Timestamp) -> Result<(), LobbyError> {
        if !self.status.can_transition_to(next) {
            return Err(LobbyError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.is_open = false;
        self.updated_at = now;
        Ok(())
    }
}
