//! InMemory Lobby Repository 実装
//!
//! ドメイン層が定義する LobbyRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! 参加・退出・ステータス変更は書き込みロックを取ったまま読み込み→検証→更新を
//! 行うため、SQL 実装のトランザクションと同じ原子性を持ちます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    Lobby, LobbyId, LobbyRepository, LobbyStatus, RepositoryError, Timestamp, UserId,
};

/// インメモリ Lobby Repository 実装
#[derive(Default)]
pub struct InMemoryLobbyRepository {
    lobbies: RwLock<HashMap<LobbyId, Lobby>>,
}

impl InMemoryLobbyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify<F>(&self, id: &LobbyId, f: F) -> Result<Lobby, RepositoryError>
    where
        F: FnOnce(&mut Lobby) -> Result<(), RepositoryError> + Send,
    {
        let mut lobbies = self.lobbies.write().await;
        let lobby = lobbies
            .get_mut(id)
            .ok_or_else(|| RepositoryError::LobbyNotFound(id.to_string()))?;
        f(lobby)?;
        Ok(lobby.clone())
    }
}

fn sorted_by_creation(mut lobbies: Vec<Lobby>) -> Vec<Lobby> {
    lobbies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    lobbies
}

#[async_trait]
impl LobbyRepository for InMemoryLobbyRepository {
    async fn create_lobby(&self, lobby: &Lobby) -> Result<(), RepositoryError> {
        let mut lobbies = self.lobbies.write().await;
        if lobbies.contains_key(&lobby.id) {
            return Err(RepositoryError::LobbyAlreadyExists(lobby.id.to_string()));
        }
        lobbies.insert(lobby.id, lobby.clone());
        Ok(())
    }

    async fn get_lobby(&self, id: &LobbyId) -> Result<Lobby, RepositoryError> {
        let lobbies = self.lobbies.read().await;
        lobbies
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::LobbyNotFound(id.to_string()))
    }

    async fn get_all_lobbies(&self) -> Result<Vec<Lobby>, RepositoryError> {
        let lobbies = self.lobbies.read().await;
        Ok(sorted_by_creation(lobbies.values().cloned().collect()))
    }

    async fn get_open_lobbies(&self) -> Result<Vec<Lobby>, RepositoryError> {
        let lobbies = self.lobbies.read().await;
        Ok(sorted_by_creation(
            lobbies
                .values()
                .filter(|lobby| lobby.is_joinable_publicly())
                .cloned()
                .collect(),
        ))
    }

    async fn update_lobby_status(
        &self,
        id: &LobbyId,
        status: LobbyStatus,
        now: Timestamp,
    ) -> Result<Lobby, RepositoryError> {
        self.modify(id, |lobby| Ok(lobby.transition_to(status, now)?))
            .await
    }

    async fn join_lobby(
        &self,
        id: &LobbyId,
        user_id: UserId,
        now: Timestamp,
    ) -> Result<Lobby, RepositoryError> {
        self.modify(id, |lobby| Ok(lobby.add_player(user_id, now)?))
            .await
    }

    async fn leave_lobby(
        &self,
        id: &LobbyId,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Lobby, RepositoryError> {
        self.modify(id, |lobby| {
            lobby.remove_player(user_id, now);
            Ok(())
        })
        .await
    }

    async fn delete_lobby(&self, id: &LobbyId) -> Result<Lobby, RepositoryError> {
        let mut lobbies = self.lobbies.write().await;
        lobbies
            .remove(id)
            .ok_or_else(|| RepositoryError::LobbyNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LobbyError, LobbyName, MaxPlayers};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryLobbyRepository の基本的な CRUD 操作
    // - 参加・退出・ステータス変更がドメインルールを通して反映されること
    //
    // 【どのようなシナリオをテストするか】
    // 1. 作成と取得、重複作成
    // 2. 公開募集中ロビーのみが open 一覧に出ること
    // 3. 満員ロビーへの参加拒否
    // 4. 存在しないロビーへの操作
    // ========================================

    fn create_test_lobby(name: &str, is_public: bool, created_at: i64) -> Lobby {
        Lobby::new(
            LobbyId::generate(),
            LobbyName::new(name).unwrap(),
            UserId::generate(),
            is_public,
            None,
            MaxPlayers::new(2).unwrap(),
            Timestamp::new(created_at),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_lobby() {
        // テスト項目: 作成したロビーを取得でき、同じ ID の再作成はエラーになる
        // given (前提条件):
        let repo = InMemoryLobbyRepository::new();
        let lobby = create_test_lobby("alpha", true, 1000);

        // when (操作):
        repo.create_lobby(&lobby).await.unwrap();
        let fetched = repo.get_lobby(&lobby.id).await;
        let duplicate = repo.create_lobby(&lobby).await;

        // then (期待する結果):
        assert_eq!(fetched, Ok(lobby.clone()));
        assert_eq!(
            duplicate,
            Err(RepositoryError::LobbyAlreadyExists(lobby.id.to_string()))
        );
    }

    #[tokio::test]
    async fn test_get_all_lobbies_sorted_by_creation() {
        // テスト項目: 全ロビーが作成順で返される
        // given (前提条件):
        let repo = InMemoryLobbyRepository::new();
        let late = create_test_lobby("late", true, 3000);
        let early = create_test_lobby("early", false, 1000);
        repo.create_lobby(&late).await.unwrap();
        repo.create_lobby(&early).await.unwrap();

        // when (操作):
        let lobbies = repo.get_all_lobbies().await.unwrap();

        // then (期待する結果):
        let names: Vec<&str> = lobbies.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_get_open_lobbies_filters_private_and_started() {
        // テスト項目: 非公開・開始済みロビーは open 一覧に含まれない
        // given (前提条件):
        let repo = InMemoryLobbyRepository::new();
        let open = create_test_lobby("open", true, 1000);
        let private = create_test_lobby("private", false, 2000);
        let started = create_test_lobby("started", true, 3000);
        for lobby in [&open, &private, &started] {
            repo.create_lobby(lobby).await.unwrap();
        }
        repo.update_lobby_status(&started.id, LobbyStatus::InProgress, Timestamp::new(4000))
            .await
            .unwrap();

        // when (操作):
        let lobbies = repo.get_open_lobbies().await.unwrap();

        // then (期待する結果):
        assert_eq!(lobbies.len(), 1);
        assert_eq!(lobbies[0].id, open.id);
    }

    #[tokio::test]
    async fn test_join_and_leave_lobby() {
        // テスト項目: 参加・退出が players に反映され、満員時は拒否される
        // given (前提条件):
        let repo = InMemoryLobbyRepository::new();
        let lobby = create_test_lobby("duel", true, 1000);
        repo.create_lobby(&lobby).await.unwrap();
        let bob = UserId::generate();
        let carol = UserId::generate();

        // when (操作):
        let joined = repo.join_lobby(&lobby.id, bob, Timestamp::new(2000)).await;
        let rejected = repo.join_lobby(&lobby.id, carol, Timestamp::new(3000)).await;
        let left = repo
            .leave_lobby(&lobby.id, &bob, Timestamp::new(4000))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(joined.unwrap().players, vec![lobby.owner_id, bob]);
        assert_eq!(
            rejected,
            Err(RepositoryError::Rejected(LobbyError::Full(2)))
        );
        assert_eq!(left.players, vec![lobby.owner_id]);
        assert_eq!(left.updated_at, Timestamp::new(4000));
    }

    #[tokio::test]
    async fn test_operations_on_missing_lobby() {
        // テスト項目: 存在しないロビーへの操作は LobbyNotFound を返す
        // given (前提条件):
        let repo = InMemoryLobbyRepository::new();
        let missing = LobbyId::generate();
        let expected = Err(RepositoryError::LobbyNotFound(missing.to_string()));

        // when (操作) / then (期待する結果):
        assert_eq!(repo.get_lobby(&missing).await, expected);
        assert_eq!(repo.delete_lobby(&missing).await, expected);
        assert_eq!(
            repo.join_lobby(&missing, UserId::generate(), Timestamp::new(1))
                .await,
            expected
        );
    }

    #[tokio::test]
    async fn test_delete_lobby_removes_it() {
        // テスト項目: 削除したロビーは取得できなくなる
        // given (前提条件):
        let repo = InMemoryLobbyRepository::new();
        let lobby = create_test_lobby("gone", true, 1000);
        repo.create_lobby(&lobby).await.unwrap();

        // when (操作):
        let deleted = repo.delete_lobby(&lobby.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(deleted.id, lobby.id);
        assert!(repo.get_all_lobbies().await.unwrap().is_empty());
    }
}
