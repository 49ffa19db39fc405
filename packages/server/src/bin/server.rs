//! Lobby and presence server for Raceway.
//!
//! Run with:
//! ```not_rust
//! JWT_ACCESS_SECRET=... cargo run --bin raceway-server
//! cargo run --bin raceway-server -- --host 0.0.0.0 --port 3000 --jwt-access-secret ...
//! ```

use std::time::Duration;

use clap::Parser;
use raceway_server::{
    config::ServerConfig,
    infrastructure::{
        auth::jwt::DEFAULT_ACCESS_TTL,
        hub::{DEFAULT_MAILBOX_CAPACITY, DEFAULT_SSE_BUFFER},
    },
    ui::{AppState, Server},
};
use raceway_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "raceway-server")]
#[command(about = "Lobby server with WebSocket and SSE support", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "RACEWAY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "RACEWAY_PORT", default_value = "8080")]
    port: u16,

    /// HS256 secret used to validate access tokens
    #[arg(long, env = "JWT_ACCESS_SECRET", hide_env_values = true)]
    jwt_access_secret: String,

    /// Outbound mailbox capacity per WebSocket connection
    #[arg(long, env = "RACEWAY_MAILBOX_CAPACITY", default_value_t = DEFAULT_MAILBOX_CAPACITY)]
    mailbox_capacity: usize,

    /// Buffered lobby updates per SSE subscriber
    #[arg(long, env = "RACEWAY_SSE_BUFFER", default_value_t = DEFAULT_SSE_BUFFER)]
    sse_buffer: usize,

    /// Access token lifetime in seconds
    #[arg(long, env = "RACEWAY_ACCESS_TTL_SECS", default_value_t = DEFAULT_ACCESS_TTL.as_secs())]
    access_ttl_secs: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            jwt_access_secret: args.jwt_access_secret,
            mailbox_capacity: args.mailbox_capacity,
            sse_buffer: args.sse_buffer,
            access_ttl: Duration::from_secs(args.access_ttl_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());

    let server = Server::new(AppState::from_config(&config));
    if let Err(e) = server.run(&config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
