//! UseCase: ロビーのステータス変更（ゲーム開始・終了・削除）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - start / close / delete の各メソッド
//! - 所有者（または管理者）のみが操作できること
//! - 削除時に接続中のメンバーが切断され、`lobby_deleted` が配信されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：所有者による開始・終了・削除
//! - 異常系：所有者以外の操作、許可されない遷移、存在しないロビー

use std::sync::Arc;

use raceway_shared::time::Clock;

use crate::{
    domain::{
        Lobby, LobbyEventPublisher, LobbyId, LobbyRepository, LobbyStatus, LobbyUpdateKind,
        Timestamp, UserClaims,
    },
    infrastructure::hub::LobbyRegistry,
};

use super::error::ChangeLobbyStatusError;

/// ステータス変更のユースケース
pub struct ChangeLobbyStatusUseCase {
    repository: Arc<dyn LobbyRepository>,
    registry: Arc<LobbyRegistry>,
    publisher: Arc<dyn LobbyEventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ChangeLobbyStatusUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        registry: Arc<LobbyRegistry>,
        publisher: Arc<dyn LobbyEventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            publisher,
            clock,
        }
    }

    /// ゲームを開始する（`active` → `in_progress`）
    pub async fn start(
        &self,
        claims: &UserClaims,
        lobby_id: &str,
    ) -> Result<Lobby, ChangeLobbyStatusError> {
        self.transition(claims, lobby_id, LobbyStatus::InProgress)
            .await
    }

    /// ロビーを終了する（`active` / `in_progress` → `closed`）
    pub async fn close(
        &self,
        claims: &UserClaims,
        lobby_id: &str,
    ) -> Result<Lobby, ChangeLobbyStatusError> {
        self.transition(claims, lobby_id, LobbyStatus::Closed).await
    }

    /// ロビーを削除する
    ///
    /// ステータスを `deleted` にしてからストレージから取り除き、
    /// 接続中のメンバーを全員切断します。
    pub async fn delete(
        &self,
        claims: &UserClaims,
        lobby_id: &str,
    ) -> Result<Lobby, ChangeLobbyStatusError> {
        let lobby_id = self.authorize(claims, lobby_id).await?;

        self.repository
            .update_lobby_status(&lobby_id, LobbyStatus::Deleted, self.now())
            .await?;
        let lobby = self.repository.delete_lobby(&lobby_id).await?;

        let disconnected = self.registry.disconnect_lobby(&lobby_id).await;
        tracing::info!(
            "Lobby '{}' deleted by user '{}' ({} live members disconnected)",
            lobby_id,
            claims.user_id,
            disconnected
        );
        self.publisher
            .publish_lobby_update(LobbyUpdateKind::Deleted, &lobby);

        Ok(lobby)
    }

    async fn transition(
        &self,
        claims: &UserClaims,
        lobby_id: &str,
        status: LobbyStatus,
    ) -> Result<Lobby, ChangeLobbyStatusError> {
        let lobby_id = self.authorize(claims, lobby_id).await?;

        let lobby = self
            .repository
            .update_lobby_status(&lobby_id, status, self.now())
            .await?;

        tracing::info!("Lobby '{}' is now {}", lobby.id, lobby.status);
        self.publisher
            .publish_lobby_update(LobbyUpdateKind::Updated, &lobby);

        Ok(lobby)
    }

    /// 所有者または管理者であることを確認する
    async fn authorize(
        &self,
        claims: &UserClaims,
        lobby_id: &str,
    ) -> Result<LobbyId, ChangeLobbyStatusError> {
        let lobby_id = LobbyId::try_from(lobby_id)?;
        let lobby = self.repository.get_lobby(&lobby_id).await?;
        if lobby.owner_id != claims.user_id && !claims.is_admin() {
            tracing::warn!(
                "User '{}' is not allowed to change lobby '{}'",
                claims.user_id,
                lobby_id
            );
            return Err(ChangeLobbyStatusError::NotOwner);
        }
        Ok(lobby_id)
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            LobbyError, LobbyName, MaxPlayers, Role, UserId, event::MockLobbyEventPublisher,
        },
        infrastructure::{hub::Connection, repository::InMemoryLobbyRepository},
    };
    use raceway_shared::time::FixedClock;

    struct Fixture {
        repository: Arc<InMemoryLobbyRepository>,
        registry: Arc<LobbyRegistry>,
        lobby: Lobby,
        owner: UserClaims,
    }

    async fn create_fixture() -> Fixture {
        let repository = Arc::new(InMemoryLobbyRepository::new());
        let owner = UserClaims {
            user_id: UserId::generate(),
            roles: vec![Role::User],
        };
        let lobby = Lobby::new(
            LobbyId::generate(),
            LobbyName::new("lobby").unwrap(),
            owner.user_id,
            true,
            None,
            MaxPlayers::new(4).unwrap(),
            Timestamp::new(1),
        );
        repository.create_lobby(&lobby).await.unwrap();
        Fixture {
            repository,
            registry: Arc::new(LobbyRegistry::new()),
            lobby,
            owner,
        }
    }

    fn create_test_usecase(
        fixture: &Fixture,
        publisher: MockLobbyEventPublisher,
    ) -> ChangeLobbyStatusUseCase {
        ChangeLobbyStatusUseCase::new(
            fixture.repository.clone(),
            fixture.registry.clone(),
            Arc::new(publisher),
            Arc::new(FixedClock::new(100)),
        )
    }

    #[tokio::test]
    async fn test_owner_starts_and_closes_lobby() {
        // テスト項目: 所有者は開始・終了でき、そのたびに lobby_updated が配信される
        // given (前提条件):
        let fixture = create_fixture().await;
        let mut publisher = MockLobbyEventPublisher::new();
        publisher
            .expect_publish_lobby_update()
            .withf(|kind, _| *kind == LobbyUpdateKind::Updated)
            .times(2)
            .return_const(0usize);
        let usecase = create_test_usecase(&fixture, publisher);
        let id = fixture.lobby.id.to_string();

        // when (操作):
        let started = usecase.start(&fixture.owner, &id).await.unwrap();
        let closed = usecase.close(&fixture.owner, &id).await.unwrap();

        // then (期待する結果):
        assert_eq!(started.status, LobbyStatus::InProgress);
        assert!(!started.is_open);
        assert_eq!(started.updated_at, Timestamp::new(100));
        assert_eq!(closed.status, LobbyStatus::Closed);
    }

    #[tokio::test]
    async fn test_non_owner_is_rejected() {
        // テスト項目: 所有者以外は操作できず、イベントも配信されない
        // given (前提条件):
        let fixture = create_fixture().await;
        let mut publisher = MockLobbyEventPublisher::new();
        publisher.expect_publish_lobby_update().never();
        let usecase = create_test_usecase(&fixture, publisher);
        let stranger = UserClaims {
            user_id: UserId::generate(),
            roles: vec![Role::User],
        };

        // when (操作):
        let result = usecase
            .delete(&stranger, &fixture.lobby.id.to_string())
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(ChangeLobbyStatusError::NotOwner));
        assert!(fixture.repository.get_lobby(&fixture.lobby.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_can_close_any_lobby() {
        // テスト項目: 管理者は他人のロビーも終了できる
        let fixture = create_fixture().await;
        let mut publisher = MockLobbyEventPublisher::new();
        publisher.expect_publish_lobby_update().return_const(0usize);
        let usecase = create_test_usecase(&fixture, publisher);
        let admin = UserClaims {
            user_id: UserId::generate(),
            roles: vec![Role::Admin],
        };

        let closed = usecase.close(&admin, &fixture.lobby.id.to_string()).await;

        assert_eq!(closed.map(|lobby| lobby.status), Ok(LobbyStatus::Closed));
    }

    #[tokio::test]
    async fn test_invalid_transition() {
        // テスト項目: 終了済みのロビーは開始できない
        // given (前提条件):
        let fixture = create_fixture().await;
        let mut publisher = MockLobbyEventPublisher::new();
        publisher.expect_publish_lobby_update().return_const(0usize);
        let usecase = create_test_usecase(&fixture, publisher);
        let id = fixture.lobby.id.to_string();
        usecase.close(&fixture.owner, &id).await.unwrap();

        // when (操作):
        let result = usecase.start(&fixture.owner, &id).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ChangeLobbyStatusError::Rejected(
                LobbyError::InvalidTransition {
                    from: LobbyStatus::Closed,
                    to: LobbyStatus::InProgress,
                }
            ))
        );
    }

    #[tokio::test]
    async fn test_delete_disconnects_live_members() {
        // テスト項目: 削除するとストレージから消え、接続中のメンバーが切断され、lobby_deleted が配信される
        // given (前提条件):
        let fixture = create_fixture().await;
        let lobby_id = fixture.lobby.id;
        let (owner_conn, _owner_mailbox) = Connection::new(fixture.owner.user_id, lobby_id, 8);
        let (guest_conn, _guest_mailbox) = Connection::new(UserId::generate(), lobby_id, 8);
        fixture.registry.register(owner_conn.clone()).await;
        fixture.registry.register(guest_conn.clone()).await;

        let mut publisher = MockLobbyEventPublisher::new();
        publisher
            .expect_publish_lobby_update()
            .withf(move |kind, lobby| {
                *kind == LobbyUpdateKind::Deleted
                    && lobby.id == lobby_id
                    && lobby.status == LobbyStatus::Deleted
            })
            .times(1)
            .return_const(1usize);
        let usecase = create_test_usecase(&fixture, publisher);

        // when (操作):
        let deleted = usecase
            .delete(&fixture.owner, &lobby_id.to_string())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(deleted.status, LobbyStatus::Deleted);
        assert!(fixture.repository.get_lobby(&lobby_id).await.is_err());
        assert!(owner_conn.is_closed());
        assert!(guest_conn.is_closed());
        assert_eq!(fixture.registry.member_count(&lobby_id).await, 0);
        assert_eq!(fixture.registry.lobby_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_lobby() {
        // テスト項目: 存在しないロビー・不正な ID はそれぞれ NotFound / InvalidLobbyId
        let fixture = create_fixture().await;
        let mut publisher = MockLobbyEventPublisher::new();
        publisher.expect_publish_lobby_update().never();
        let usecase = create_test_usecase(&fixture, publisher);

        let missing = usecase
            .start(&fixture.owner, &LobbyId::generate().to_string())
            .await;
        let invalid = usecase.start(&fixture.owner, "nope").await;

        assert_eq!(missing, Err(ChangeLobbyStatusError::NotFound));
        assert!(matches!(
            invalid,
            Err(ChangeLobbyStatusError::InvalidLobbyId(_))
        ));
    }
}
