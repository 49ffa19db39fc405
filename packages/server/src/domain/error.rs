//! Domain error types.

use thiserror::Error;

use super::entity::LobbyStatus;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("invalid lobby id '{0}'")]
    InvalidLobbyId(String),

    #[error("invalid user id '{0}'")]
    InvalidUserId(String),

    #[error("lobby name must not be empty")]
    EmptyLobbyName,

    #[error("lobby name is too long ({0} characters)")]
    LobbyNameTooLong(usize),

    #[error("max players must be between 1 and 16, got {0}")]
    InvalidMaxPlayers(i64),
}

/// Lobby business rule violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("lobby is not open for joining")]
    NotOpen,

    #[error("lobby is full ({0} players)")]
    Full(usize),

    #[error("cannot move lobby from {from} to {to}")]
    InvalidTransition { from: LobbyStatus, to: LobbyStatus },
}

/// Persistence errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("lobby '{0}' not found")]
    LobbyNotFound(String),

    #[error("lobby '{0}' already exists")]
    LobbyAlreadyExists(String),

    #[error(transparent)]
    Rejected(#[from] LobbyError),
}

/// Access token validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("access token required")]
    MissingToken,

    #[error("access token has expired")]
    ExpiredToken,

    #[error("invalid access token")]
    InvalidToken,
}

/// Password hashing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed")]
    MalformedHash,

    #[error("password worker failed: {0}")]
    Worker(String),
}
