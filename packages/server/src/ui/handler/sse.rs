//! SSE endpoint handler.
//!
//! Each client first receives one event per existing lobby (the bare lobby
//! JSON), then the `{type, lobby}` envelope of every lifecycle event
//! published after it subscribed.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream, StreamExt};

use crate::{
    domain::Lobby,
    infrastructure::dto::http::LobbyDto,
    ui::{error::ApiError, state::AppState},
};

fn snapshot_event(lobby: &Lobby) -> Option<Event> {
    match serde_json::to_string(&LobbyDto::from(lobby)) {
        Ok(json) => Some(Event::default().data(json)),
        Err(e) => {
            tracing::error!("Failed to serialize lobby '{}': {}", lobby.id, e);
            None
        }
    }
}

/// `GET /api/v1/sse/public`
pub async fn sse_public_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let mut feed = state.watch_lobbies_usecase.watch().await?;

    let snapshot: Vec<Result<Event, Infallible>> = feed
        .take_snapshot()
        .iter()
        .filter_map(snapshot_event)
        .map(Ok)
        .collect();
    tracing::debug!("Sending {} lobbies to new SSE subscriber", snapshot.len());

    // The feed (and with it the subscription) is dropped when the client goes away.
    let live = stream::unfold(feed, |mut feed| async move {
        let update = feed.next_update().await?;
        Some((Ok(Event::default().data(&*update.data)), feed))
    });

    Ok(Sse::new(stream::iter(snapshot).chain(live)).keep_alive(KeepAlive::default()))
}
