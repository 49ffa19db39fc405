//! Server configuration.

use std::time::Duration;

use crate::infrastructure::{
    auth::jwt::DEFAULT_ACCESS_TTL,
    hub::{DEFAULT_MAILBOX_CAPACITY, DEFAULT_SSE_BUFFER},
};

/// Everything needed to build and run the server.
///
/// Built from command line arguments / environment variables by the server
/// binary, and directly by tests.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// HS256 secret shared with the auth service that issues access tokens
    pub jwt_access_secret: String,
    /// Outbound mailbox capacity per WebSocket connection
    pub mailbox_capacity: usize,
    /// Buffered lobby updates per SSE subscriber
    pub sse_buffer: usize,
    pub access_ttl: Duration,
}

impl ServerConfig {
    pub fn new(jwt_access_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_access_secret: jwt_access_secret.into(),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            sse_buffer: DEFAULT_SSE_BUFFER,
            access_ttl: DEFAULT_ACCESS_TTL,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
