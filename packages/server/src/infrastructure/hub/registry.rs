//! Live WebSocket members per lobby.
//!
//! ## 責務
//!
//! - lobby id → (user id → Connection) の管理（登録・登録解除）
//! - ロビー内のメンバー全員への fan-out（best-effort multicast）
//! - 切断処理（1 接続につき 1 回だけ実行される）
//!
//! ## 並行性
//!
//! マップ全体を 1 つの `RwLock` で保護します。ブロードキャストは読み込みロック
//! の下でメンバーのスナップショットを取り、ロックを解放してからメールボックスへ
//! 積みます。送信に失敗したメンバーはその後で切断します。

use std::{collections::HashMap, sync::Arc};

use axum::extract::ws::Utf8Bytes;
use tokio::sync::RwLock;

use crate::domain::{LobbyId, UserId};

use super::connection::Connection;

/// Per-recipient outcome of a lobby broadcast.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Members whose mailbox accepted the payload
    pub delivered: usize,
    /// Members disconnected because their mailbox was closed or full
    pub disconnected: Vec<UserId>,
}

#[derive(Default)]
pub struct LobbyRegistry {
    lobbies: RwLock<HashMap<LobbyId, HashMap<UserId, Arc<Connection>>>>,
}

impl LobbyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the connection of `(lobby, user)`.
    ///
    /// Returns the replaced connection. The caller is expected to disconnect
    /// it; doing so will not touch the new entry.
    pub async fn register(&self, connection: Arc<Connection>) -> Option<Arc<Connection>> {
        let mut lobbies = self.lobbies.write().await;
        let previous = lobbies
            .entry(connection.lobby_id())
            .or_default()
            .insert(connection.user_id(), connection.clone());
        tracing::debug!(
            "Registered user '{}' in lobby '{}' (connection {})",
            connection.user_id(),
            connection.lobby_id(),
            connection.id().value()
        );
        previous
    }

    /// Remove the entry of `(lobby, user)` if present, dropping the lobby
    /// from the index once it has no members. Idempotent.
    pub async fn deregister(&self, lobby_id: &LobbyId, user_id: &UserId) -> Option<Arc<Connection>> {
        let mut lobbies = self.lobbies.write().await;
        let members = lobbies.get_mut(lobby_id)?;
        let removed = members.remove(user_id);
        if members.is_empty() {
            lobbies.remove(lobby_id);
        }
        removed
    }

    /// Remove `connection` only if it is still the registered one for its
    /// `(lobby, user)` pair.
    async fn deregister_connection(&self, connection: &Connection) -> bool {
        let mut lobbies = self.lobbies.write().await;
        let Some(members) = lobbies.get_mut(&connection.lobby_id()) else {
            return false;
        };
        let is_current = members
            .get(&connection.user_id())
            .is_some_and(|current| current.id() == connection.id());
        if !is_current {
            return false;
        }
        members.remove(&connection.user_id());
        if members.is_empty() {
            lobbies.remove(&connection.lobby_id());
        }
        true
    }

    /// Close the connection and deregister it.
    ///
    /// Safe to call concurrently from the read pump, the write pump and any
    /// broadcaster: only the first call does anything. Returns whether this
    /// call performed the disconnect.
    pub async fn disconnect(&self, connection: &Arc<Connection>) -> bool {
        if !connection.close() {
            return false;
        }
        let deregistered = self.deregister_connection(connection).await;
        tracing::info!(
            "User '{}' disconnected from lobby '{}' (connection {}, deregistered: {})",
            connection.user_id(),
            connection.lobby_id(),
            connection.id().value(),
            deregistered
        );
        true
    }

    /// Enqueue `payload` for every live member of the lobby.
    ///
    /// Members whose enqueue fails are disconnected; the others still get
    /// the payload. Never fails as a whole.
    pub async fn broadcast(&self, lobby_id: &LobbyId, payload: Utf8Bytes) -> BroadcastReport {
        let members: Vec<Arc<Connection>> = {
            let lobbies = self.lobbies.read().await;
            match lobbies.get(lobby_id) {
                Some(members) => members.values().cloned().collect(),
                None => return BroadcastReport::default(),
            }
        };

        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();
        for member in members {
            match member.enqueue(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to push message to user '{}' in lobby '{}': {}",
                        member.user_id(),
                        lobby_id,
                        e
                    );
                    failed.push(member);
                }
            }
        }

        for member in failed {
            self.disconnect(&member).await;
            report.disconnected.push(member.user_id());
        }

        tracing::debug!(
            "Broadcast to lobby '{}': {} delivered, {} disconnected",
            lobby_id,
            report.delivered,
            report.disconnected.len()
        );
        report
    }

    /// Enqueue `payload` for a single connection, disconnecting it on failure.
    pub async fn send_to(&self, connection: &Arc<Connection>, payload: Utf8Bytes) -> bool {
        match connection.enqueue(payload) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to push message to user '{}': {}",
                    connection.user_id(),
                    e
                );
                self.disconnect(connection).await;
                false
            }
        }
    }

    /// Disconnect every live member of a lobby, returning how many there were.
    pub async fn disconnect_lobby(&self, lobby_id: &LobbyId) -> usize {
        let members = {
            let mut lobbies = self.lobbies.write().await;
            lobbies.remove(lobby_id).unwrap_or_default()
        };
        let count = members.len();
        for member in members.into_values() {
            member.close();
        }
        if count > 0 {
            tracing::info!("Disconnected {} member(s) of lobby '{}'", count, lobby_id);
        }
        count
    }

    /// Registered connection of `(lobby, user)`.
    pub async fn connection(&self, lobby_id: &LobbyId, user_id: &UserId) -> Option<Arc<Connection>> {
        let lobbies = self.lobbies.read().await;
        lobbies.get(lobby_id)?.get(user_id).cloned()
    }

    /// Connected user ids of a lobby, sorted.
    pub async fn member_ids(&self, lobby_id: &LobbyId) -> Vec<UserId> {
        let lobbies = self.lobbies.read().await;
        let mut ids: Vec<UserId> = lobbies
            .get(lobby_id)
            .map(|members| members.keys().copied().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    pub async fn member_count(&self, lobby_id: &LobbyId) -> usize {
        let lobbies = self.lobbies.read().await;
        lobbies.get(lobby_id).map_or(0, HashMap::len)
    }

    /// Number of lobbies with at least one live member.
    pub async fn lobby_count(&self) -> usize {
        self.lobbies.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::hub::connection::{EnqueueError, Mailbox};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 登録・登録解除（空ロビーの掃除、冪等性）
    // - 同一ユーザーの再接続時の置き換え（排他性）
    // - ブロードキャストの完全性と障害分離
    // - 切断の冪等性（並行呼び出しでも登録解除は 1 回）
    // ========================================

    fn connect(
        lobby_id: LobbyId,
        user_id: UserId,
        capacity: usize,
    ) -> (Arc<Connection>, Mailbox) {
        Connection::new(user_id, lobby_id, capacity)
    }

    #[tokio::test]
    async fn test_register_creates_lobby_entry() {
        // テスト項目: 初めての登録でロビーのエントリが作られる
        // given (前提条件):
        let registry = LobbyRegistry::new();
        let lobby_id = LobbyId::generate();
        let user_id = UserId::generate();
        let (connection, _mailbox) = connect(lobby_id, user_id, 4);

        // when (操作):
        let previous = registry.register(connection.clone()).await;

        // then (期待する結果):
        assert!(previous.is_none());
        assert_eq!(registry.lobby_count().await, 1);
        assert_eq!(registry.member_ids(&lobby_id).await, vec![user_id]);
    }

    #[tokio::test]
    async fn test_deregister_removes_empty_lobby_and_is_idempotent() {
        // テスト項目: 最後のメンバーの登録解除でロビーのエントリも消え、2 回目は何もしない
        // given (前提条件):
        let registry = LobbyRegistry::new();
        let lobby_id = LobbyId::generate();
        let user_id = UserId::generate();
        let (connection, _mailbox) = connect(lobby_id, user_id, 4);
        registry.register(connection).await;

        // when (操作):
        let first = registry.deregister(&lobby_id, &user_id).await;
        let second = registry.deregister(&lobby_id, &user_id).await;

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(registry.lobby_count().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_register_keeps_exactly_one_connection() {
        // テスト項目: 同じ (lobby, user) への並行登録後、登録されているのは 1 接続のみ
        // given (前提条件):
        let registry = Arc::new(LobbyRegistry::new());
        let lobby_id = LobbyId::generate();
        let user_id = UserId::generate();

        // when (操作):
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (connection, mailbox) = connect(lobby_id, user_id, 4);
                let previous = registry.register(connection.clone()).await;
                (connection, mailbox, previous)
            }));
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        // then (期待する結果):
        assert_eq!(registry.member_count(&lobby_id).await, 1);
        let current = registry.connection(&lobby_id, &user_id).await.unwrap();
        // 置き換えられた接続は 15 個、置き換えられていないのは現在の接続のみ
        let replaced: Vec<_> = results.iter().filter_map(|(_, _, p)| p.clone()).collect();
        assert_eq!(replaced.len(), 15);
        assert!(replaced.iter().all(|p| p.id() != current.id()));
    }

    #[tokio::test]
    async fn test_disconnecting_replaced_connection_keeps_replacement() {
        // テスト項目: 置き換えられた古い接続を切断しても新しい接続は残る
        // given (前提条件):
        let registry = LobbyRegistry::new();
        let lobby_id = LobbyId::generate();
        let user_id = UserId::generate();
        let (old, _old_mailbox) = connect(lobby_id, user_id, 4);
        let (new, _new_mailbox) = connect(lobby_id, user_id, 4);
        registry.register(old).await;
        let replaced = registry.register(new.clone()).await.unwrap();

        // when (操作):
        let disconnected = registry.disconnect(&replaced).await;

        // then (期待する結果):
        assert!(disconnected);
        let current = registry.connection(&lobby_id, &user_id).await.unwrap();
        assert_eq!(current.id(), new.id());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_member_once() {
        // テスト項目: ロビーの全メンバーがメッセージをちょうど 1 回受け取り、他ロビーには届かない
        // given (前提条件):
        let registry = LobbyRegistry::new();
        let lobby_id = LobbyId::generate();
        let other_lobby = LobbyId::generate();
        let mut mailboxes = Vec::new();
        for _ in 0..3 {
            let (connection, mailbox) = connect(lobby_id, UserId::generate(), 4);
            registry.register(connection).await;
            mailboxes.push(mailbox);
        }
        let (outsider, mut outsider_mailbox) = connect(other_lobby, UserId::generate(), 4);
        registry.register(outsider).await;

        // when (操作):
        let report = registry.broadcast(&lobby_id, "hello".into()).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 3);
        assert!(report.disconnected.is_empty());
        for mailbox in &mut mailboxes {
            assert_eq!(mailbox.recv().await.unwrap().as_str(), "hello");
            assert!(mailbox.try_recv().is_err());
        }
        assert!(outsider_mailbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_isolates_dead_member() {
        // テスト項目: 既に閉じたメンバーがいても他のメンバーには届き、閉じたメンバーは削除される
        // given (前提条件):
        let registry = LobbyRegistry::new();
        let lobby_id = LobbyId::generate();
        let (x, x_mailbox) = connect(lobby_id, UserId::generate(), 4);
        let (y, mut y_mailbox) = connect(lobby_id, UserId::generate(), 4);
        let (z, mut z_mailbox) = connect(lobby_id, UserId::generate(), 4);
        for connection in [&x, &y, &z] {
            registry.register(connection.clone()).await;
        }
        // X の write pump が終了している（トランスポートが閉じている）状態
        drop(x_mailbox);

        // when (操作):
        let report = registry.broadcast(&lobby_id, "go".into()).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert_eq!(report.disconnected, vec![x.user_id()]);
        assert_eq!(y_mailbox.recv().await.unwrap().as_str(), "go");
        assert_eq!(z_mailbox.recv().await.unwrap().as_str(), "go");
        assert!(x.is_closed());
        let mut expected = vec![y.user_id(), z.user_id()];
        expected.sort();
        assert_eq!(registry.member_ids(&lobby_id).await, expected);
    }

    #[tokio::test]
    async fn test_broadcast_disconnects_member_with_full_mailbox() {
        // テスト項目: メールボックスが満杯のメンバーは切断される
        // given (前提条件):
        let registry = LobbyRegistry::new();
        let lobby_id = LobbyId::generate();
        let (slow, _slow_mailbox) = connect(lobby_id, UserId::generate(), 1);
        registry.register(slow.clone()).await;
        slow.enqueue("backlog".into()).unwrap();

        // when (操作):
        let report = registry.broadcast(&lobby_id, "next".into()).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 0);
        assert_eq!(report.disconnected, vec![slow.user_id()]);
        assert_eq!(registry.lobby_count().await, 0);
        assert_eq!(slow.enqueue("after".into()), Err(EnqueueError::Closed));
    }

    #[tokio::test]
    async fn test_broadcast_to_unknown_lobby_is_noop() {
        // テスト項目: 接続のないロビーへのブロードキャストは何もしない
        let registry = LobbyRegistry::new();

        let report = registry.broadcast(&LobbyId::generate(), "x".into()).await;

        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn test_concurrent_disconnect_happens_once() {
        // テスト項目: 同じ接続への並行した切断でも、実際の切断は 1 回だけ
        // given (前提条件):
        let registry = Arc::new(LobbyRegistry::new());
        let lobby_id = LobbyId::generate();
        let (connection, _mailbox) = connect(lobby_id, UserId::generate(), 4);
        registry.register(connection.clone()).await;

        // when (操作):
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            let connection = connection.clone();
            handles.push(tokio::spawn(async move {
                registry.disconnect(&connection).await
            }));
        }
        let mut performed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                performed += 1;
            }
        }

        // then (期待する結果):
        assert_eq!(performed, 1);
        assert_eq!(registry.lobby_count().await, 0);
    }

    #[tokio::test]
    async fn test_send_to_disconnects_on_failure() {
        // テスト項目: 個別送信に失敗した接続は切断される
        // given (前提条件):
        let registry = LobbyRegistry::new();
        let lobby_id = LobbyId::generate();
        let (connection, mailbox) = connect(lobby_id, UserId::generate(), 4);
        registry.register(connection.clone()).await;
        drop(mailbox);

        // when (操作):
        let sent = registry.send_to(&connection, "pong".into()).await;

        // then (期待する結果):
        assert!(!sent);
        assert!(connection.is_closed());
        assert_eq!(registry.member_count(&lobby_id).await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_lobby_closes_all_members() {
        // テスト項目: ロビー単位の切断で全メンバーのメールボックスが閉じる
        // given (前提条件):
        let registry = LobbyRegistry::new();
        let lobby_id = LobbyId::generate();
        let (a, mut a_mailbox) = connect(lobby_id, UserId::generate(), 4);
        let (b, mut b_mailbox) = connect(lobby_id, UserId::generate(), 4);
        registry.register(a.clone()).await;
        registry.register(b.clone()).await;

        // when (操作):
        let count = registry.disconnect_lobby(&lobby_id).await;

        // then (期待する結果):
        assert_eq!(count, 2);
        assert!(a_mailbox.recv().await.is_none());
        assert!(b_mailbox.recv().await.is_none());
        assert_eq!(registry.lobby_count().await, 0);
        // 後から pump が切断を呼んでも何も起きない
        assert!(!registry.disconnect(&a).await);
    }
}
