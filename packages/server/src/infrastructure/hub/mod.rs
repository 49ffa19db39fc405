//! The real-time lobby hub.
//!
//! - `connection`: one live WebSocket member and its outbound mailbox
//! - `registry`: live members per lobby, lobby-scoped fan-out
//! - `sse`: lobby-agnostic SSE subscribers
//! - `broadcaster`: lobby lifecycle events pushed to SSE subscribers

pub mod broadcaster;
pub mod connection;
pub mod registry;
pub mod sse;

pub use broadcaster::LobbyUpdateBroadcaster;
pub use connection::{Connection, ConnectionId, DEFAULT_MAILBOX_CAPACITY, EnqueueError, Mailbox};
pub use registry::{BroadcastReport, LobbyRegistry};
pub use sse::{DEFAULT_SSE_BUFFER, LobbyUpdate, SseSubscriberSet, SseSubscription, SubscriptionId};
