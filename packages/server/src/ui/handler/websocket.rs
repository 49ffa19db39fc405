//! WebSocket connection handlers.
//!
//! Each connection runs two tasks that share nothing but the mailbox:
//!
//! - read pump: reads frames and hands text frames to the session use case
//! - write pump: drains the mailbox into the socket; the only socket writer
//!
//! Whichever side fails first disconnects the connection. That drops the
//! mailbox sender (the write pump sends a close frame and exits) and cancels
//! the connection (the read pump stops reading).

use std::{fmt::Display, sync::Arc};

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};

use crate::{
    infrastructure::hub::{Connection, Mailbox},
    ui::{auth::access_token, error::ApiError, state::AppState},
    usecase::{LobbySessionUseCase, MemberSession},
};

/// `GET /api/v1/lobbies/{id}/ws`
///
/// The connection is authenticated and registered before the upgrade, so a
/// rejected request never reaches the hub.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let session = match state
        .lobby_session_usecase
        .connect(access_token(&headers), &lobby_id)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Rejected WebSocket connection to lobby '{}': {}", lobby_id, e);
            return ApiError::from(e).into_response();
        }
    };

    let usecase = state.lobby_session_usecase.clone();
    let connection = session.connection.clone();
    ws.on_failed_upgrade(move |e| {
        tracing::warn!(
            "WebSocket upgrade failed for user '{}': {}",
            connection.user_id(),
            e
        );
        tokio::spawn(async move {
            usecase.disconnect(&connection).await;
        });
    })
    .on_upgrade(move |socket| handle_socket(socket, state, session))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, session: MemberSession) {
    let MemberSession {
        claims,
        connection,
        mailbox,
    } = session;
    let usecase = state.lobby_session_usecase.clone();
    let (sender, receiver) = socket.split();

    let write_task = tokio::spawn(write_pump(
        sender,
        mailbox,
        usecase.clone(),
        connection.clone(),
    ));
    let read_task = tokio::spawn(read_pump(receiver, usecase.clone(), connection.clone()));

    let (write_result, read_result) = tokio::join!(write_task, read_task);
    if let Err(e) = write_result {
        tracing::error!("Write pump of user '{}' panicked: {}", claims.user_id, e);
    }
    if let Err(e) = read_result {
        tracing::error!("Read pump of user '{}' panicked: {}", claims.user_id, e);
    }

    usecase.disconnect(&connection).await;
}

/// Read frames until the peer goes away or the connection is cancelled.
///
/// Frames are handled one at a time, in arrival order.
pub(crate) async fn read_pump<S, E>(
    mut receiver: S,
    usecase: Arc<LobbySessionUseCase>,
    connection: Arc<Connection>,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let frame = tokio::select! {
            _ = connection.cancelled() => {
                tracing::debug!("Read pump of user '{}' cancelled", connection.user_id());
                break;
            }
            frame = receiver.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                tracing::debug!("Received text from '{}': {}", connection.user_id(), text);
                usecase.relay(&connection, text).await;
            }
            Some(Ok(Message::Binary(bytes))) => {
                tracing::debug!(
                    "Ignoring binary frame ({} bytes) from '{}'",
                    bytes.len(),
                    connection.user_id()
                );
            }
            Some(Ok(Message::Close(_))) | None => {
                tracing::debug!("User '{}' closed the connection", connection.user_id());
                break;
            }
            // Protocol ping/pong is answered by the WebSocket layer
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            Some(Err(e)) => {
                tracing::warn!("WebSocket error from '{}': {}", connection.user_id(), e);
                break;
            }
        }
    }

    usecase.disconnect(&connection).await;
}

/// Drain the mailbox into the socket. Sends a close frame once the mailbox
/// is closed.
pub(crate) async fn write_pump<S>(
    mut sender: S,
    mut mailbox: Mailbox,
    usecase: Arc<LobbySessionUseCase>,
    connection: Arc<Connection>,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(payload) = mailbox.recv().await {
        if let Err(e) = sender.send(Message::Text(payload)).await {
            tracing::warn!("Failed to write to '{}': {}", connection.user_id(), e);
            usecase.disconnect(&connection).await;
            return;
        }
    }

    if let Err(e) = sender.send(Message::Close(None)).await {
        tracing::debug!("Failed to send close frame to '{}': {}", connection.user_id(), e);
    }
}
