//! Lobby-agnostic SSE subscribers.
//!
//! Each subscriber owns a small bounded buffer that its SSE response stream
//! drains. Publishing never blocks: a subscriber whose buffer is full or
//! whose stream is gone is dropped from the set on the spot.

use std::sync::{
    Arc, Mutex, PoisonError, Weak,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::mpsc;

use crate::domain::{LobbyId, LobbyUpdateKind};

pub const DEFAULT_SSE_BUFFER: usize = 64;

/// A lobby lifecycle event, serialized once for every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyUpdate {
    pub kind: LobbyUpdateKind,
    pub lobby_id: LobbyId,
    /// JSON envelope sent as the `data:` field
    pub data: Arc<str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    sender: mpsc::Sender<Arc<LobbyUpdate>>,
}

pub struct SseSubscriberSet {
    next_id: AtomicU64,
    buffer: usize,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl SseSubscriberSet {
    pub fn new(buffer: usize) -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            buffer: buffer.max(1),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Add a subscriber. It stays in the set until the returned
    /// subscription is dropped or a publish to it fails.
    pub fn subscribe(self: &Arc<Self>) -> SseSubscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(self.buffer);
        self.lock().push(Subscriber { id, sender });
        tracing::info!("SSE subscriber {} connected", id.0);
        SseSubscription {
            id,
            receiver,
            set: Arc::downgrade(self),
        }
    }

    /// Remove a subscriber, returning whether it was present.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        let removed = subscribers.len() != before;
        if removed {
            tracing::info!("SSE subscriber {} disconnected", id.0);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Deliver `update` to every current subscriber, returning how many
    /// accepted it.
    pub fn publish(&self, update: Arc<LobbyUpdate>) -> usize {
        let snapshot: Vec<(SubscriptionId, mpsc::Sender<Arc<LobbyUpdate>>)> = self
            .lock()
            .iter()
            .map(|subscriber| (subscriber.id, subscriber.sender.clone()))
            .collect();

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (id, sender) in snapshot {
            match sender.try_send(update.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!("Failed to send lobby update to SSE subscriber {}: {}", id.0, e);
                    failed.push(id);
                }
            }
        }

        if !failed.is_empty() {
            self.lock().retain(|subscriber| !failed.contains(&subscriber.id));
        }
        delivered
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving side of one SSE subscriber. Dropping it unsubscribes.
pub struct SseSubscription {
    id: SubscriptionId,
    receiver: mpsc::Receiver<Arc<LobbyUpdate>>,
    set: Weak<SseSubscriberSet>,
}

impl SseSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Next update, or `None` once the subscriber has been dropped from the set.
    pub async fn recv(&mut self) -> Option<Arc<LobbyUpdate>> {
        self.receiver.recv().await
    }
}

impl Drop for SseSubscription {
    fn drop(&mut self) {
        if let Some(set) = self.set.upgrade() {
            set.unsubscribe(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_update(kind: LobbyUpdateKind) -> Arc<LobbyUpdate> {
        Arc::new(LobbyUpdate {
            kind,
            lobby_id: LobbyId::generate(),
            data: Arc::from(r#"{"type":"lobby_created"}"#),
        })
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        // テスト項目: 全購読者が同一のイベントを受け取る
        // given (前提条件):
        let set = SseSubscriberSet::new(4);
        let mut first = set.subscribe();
        let mut second = set.subscribe();
        let update = create_test_update(LobbyUpdateKind::Created);

        // when (操作):
        let delivered = set.publish(update.clone());

        // then (期待する結果):
        assert_eq!(delivered, 2);
        assert_eq!(first.recv().await, Some(update.clone()));
        assert_eq!(second.recv().await, Some(update));
    }

    #[tokio::test]
    async fn test_drop_subscription_unsubscribes() {
        // テスト項目: 購読を drop すると購読者集合から外れる
        // given (前提条件):
        let set = SseSubscriberSet::new(4);
        let subscription = set.subscribe();
        let id = subscription.id();

        // when (操作):
        drop(subscription);

        // then (期待する結果):
        assert_eq!(set.subscriber_count(), 0);
        assert!(!set.unsubscribe(id));
    }

    #[tokio::test]
    async fn test_failed_subscribers_are_purged_without_skipping_neighbours() {
        // テスト項目: 送信に失敗した購読者が連続していても、隣の購読者を飛ばさずに全て処理される
        // given (前提条件):
        let set = SseSubscriberSet::new(1);
        let mut healthy_a = set.subscribe();
        let stuck_b = set.subscribe();
        let stuck_c = set.subscribe();
        let mut healthy_d = set.subscribe();
        // b と c のバッファを埋めておく
        let backlog = create_test_update(LobbyUpdateKind::Updated);
        set.publish(backlog.clone());
        healthy_a.recv().await.unwrap();
        healthy_d.recv().await.unwrap();

        // when (操作):
        let update = create_test_update(LobbyUpdateKind::Created);
        let delivered = set.publish(update.clone());

        // then (期待する結果):
        assert_eq!(delivered, 2);
        assert_eq!(healthy_a.recv().await, Some(update.clone()));
        assert_eq!(healthy_d.recv().await, Some(update));
        assert_eq!(set.subscriber_count(), 2);
        drop((stuck_b, stuck_c));
        assert_eq!(set.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_purged_subscriber_stream_ends_after_backlog() {
        // テスト項目: 集合から外された購読者は、溜まっていた分を受け取った後に None になる
        // given (前提条件):
        let set = SseSubscriberSet::new(1);
        let mut subscription = set.subscribe();
        let backlog = create_test_update(LobbyUpdateKind::Updated);
        set.publish(backlog.clone());

        // when (操作):
        set.publish(create_test_update(LobbyUpdateKind::Deleted));

        // then (期待する結果):
        assert_eq!(subscription.recv().await, Some(backlog));
        assert_eq!(subscription.recv().await, None);
    }

    #[test]
    fn test_publish_without_subscribers() {
        // テスト項目: 購読者がいなくても publish は失敗しない
        let set = SseSubscriberSet::new(4);

        assert_eq!(set.publish(create_test_update(LobbyUpdateKind::Deleted)), 0);
    }
}
