//! Data Transfer Objects (DTOs) for the lobby server.
//!
//! DTOs are organized by protocol:
//! - `http`: HTTP API request and response DTOs
//! - `websocket`: WebSocket frame DTOs
//! - `sse`: lobby update envelope pushed over SSE

pub mod conversion;
pub mod http;
pub mod sse;
pub mod websocket;
