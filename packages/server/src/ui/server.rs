//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::{
    handler::{
        close_lobby, create_lobby, delete_lobby, get_lobby, health_check, join_lobby, leave_lobby,
        list_lobbies, list_open_lobbies, sse_public_handler, start_lobby, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Lobby server
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::new(secret);
/// let server = Server::new(AppState::from_config(&config));
/// server.run(&config).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Build the router with every endpoint and the request trace layer.
    pub fn router(&self) -> Router {
        let api = Router::new()
            .route("/lobbies", get(list_lobbies).post(create_lobby))
            .route("/lobbies/open", get(list_open_lobbies))
            .route("/lobbies/{id}", get(get_lobby).delete(delete_lobby))
            .route("/lobbies/{id}/join", post(join_lobby))
            .route("/lobbies/{id}/leave", post(leave_lobby))
            .route("/lobbies/{id}/start", post(start_lobby))
            .route("/lobbies/{id}/close", post(close_lobby))
            .route("/lobbies/{id}/ws", get(websocket_handler))
            .route("/sse/public", get(sse_public_handler));

        Router::new()
            .route("/api/health", get(health_check))
            .nest("/api/v1", api)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until the shutdown signal.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();

        tracing::info!("Lobby server listening on {}", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Bind to the configured address and run the server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address
    /// or if there's an error during server execution.
    pub async fn run(self, config: &ServerConfig) -> std::io::Result<()> {
        let listener = TcpListener::bind(config.bind_addr()).await?;
        self.serve(listener).await
    }
}
