//! Request handlers.

mod http;
mod sse;
mod websocket;

pub use http::{
    close_lobby, create_lobby, delete_lobby, get_lobby, health_check, join_lobby, leave_lobby,
    list_lobbies, list_open_lobbies, start_lobby,
};
pub use sse::sse_public_handler;
pub use websocket::websocket_handler;
