//! Lobby Update Broadcaster.
//!
//! Turns lobby lifecycle events into the `{type, lobby}` envelope and fans
//! it out to every SSE subscriber.

use std::sync::Arc;

use crate::{
    domain::{Lobby, LobbyEventPublisher, LobbyUpdateKind},
    infrastructure::dto::sse::LobbyUpdateMessage,
};

use super::sse::{LobbyUpdate, SseSubscriberSet};

pub struct LobbyUpdateBroadcaster {
    subscribers: Arc<SseSubscriberSet>,
}

impl LobbyUpdateBroadcaster {
    pub fn new(subscribers: Arc<SseSubscriberSet>) -> Self {
        Self { subscribers }
    }
}

impl LobbyEventPublisher for LobbyUpdateBroadcaster {
    fn publish_lobby_update(&self, kind: LobbyUpdateKind, lobby: &Lobby) -> usize {
        let message = LobbyUpdateMessage::new(kind, lobby);
        let data = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize lobby update for '{}': {}", lobby.id, e);
                return 0;
            }
        };

        let delivered = self.subscribers.publish(Arc::new(LobbyUpdate {
            kind,
            lobby_id: lobby.id,
            data: Arc::from(data),
        }));
        tracing::info!(
            "Broadcasted {} for lobby '{}' to {} SSE subscriber(s)",
            kind.as_str(),
            lobby.id,
            delivered
        );
        delivered
    }
}
