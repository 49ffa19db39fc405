//! A live WebSocket member of a lobby.
//!
//! The socket itself is owned by the two pump tasks; everything else reaches
//! the client through the bounded mailbox, whose only consumer is the write
//! pump.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use axum::extract::ws::Utf8Bytes;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::domain::{LobbyId, UserId};

pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Receiving half of a connection's mailbox, drained by the write pump.
pub type Mailbox = mpsc::Receiver<Utf8Bytes>;

/// Process-unique connection identifier.
///
/// Distinguishes a replaced connection from the one that replaced it when
/// both belong to the same user in the same lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    #[error("mailbox is full")]
    Full,

    #[error("mailbox is closed")]
    Closed,
}

pub struct Connection {
    id: ConnectionId,
    user_id: UserId,
    lobby_id: LobbyId,
    /// `None` once the connection is closed; dropping the only sender ends the write pump
    sender: Mutex<Option<mpsc::Sender<Utf8Bytes>>>,
    closed: AtomicBool,
    cancel: CancellationToken,
}

impl Connection {
    /// Create a connection and the mailbox its write pump will drain.
    pub fn new(user_id: UserId, lobby_id: LobbyId, mailbox_capacity: usize) -> (Arc<Self>, Mailbox) {
        let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
        let connection = Arc::new(Self {
            id: ConnectionId::next(),
            user_id,
            lobby_id,
            sender: Mutex::new(Some(tx)),
            closed: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        });
        (connection, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn lobby_id(&self) -> LobbyId {
        self.lobby_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Non-blocking push into the mailbox.
    pub fn enqueue(&self, payload: Utf8Bytes) -> Result<(), EnqueueError> {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = sender.as_ref() else {
            return Err(EnqueueError::Closed);
        };
        sender.try_send(payload).map_err(|e| match e {
            TrySendError::Full(_) => EnqueueError::Full,
            TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }

    /// Resolves once the connection has been closed.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    /// Close the mailbox and stop the read pump.
    ///
    /// Returns `true` only for the one caller that performed the close.
    pub(crate) fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.cancel.cancel();
        true
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("lobby_id", &self.lobby_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
