//! Lobby lifecycle events.

use super::entity::Lobby;

/// Kind of lobby lifecycle event pushed to lobby browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LobbyUpdateKind {
    Created,
    Updated,
    Deleted,
}

impl LobbyUpdateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "lobby_created",
            Self::Updated => "lobby_updated",
            Self::Deleted => "lobby_deleted",
        }
    }
}

/// Fan-out of lobby lifecycle events.
///
/// Delivery is best effort: subscribers that cannot take the event are
/// dropped, and the publish call itself never fails.
#[cfg_attr(test, mockall::automock)]
pub trait LobbyEventPublisher: Send + Sync {
    /// Publish an event, returning the number of subscribers reached.
    fn publish_lobby_update(&self, kind: LobbyUpdateKind, lobby: &Lobby) -> usize;
}
