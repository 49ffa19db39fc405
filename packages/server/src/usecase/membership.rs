//! UseCase: ロビーへの参加・退出
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - MembershipUseCase::join() / leave()
//! - パスワード付きロビーの検証、満員・募集終了の拒否、`lobby_updated` の配信
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加・退出（退出時は接続中の WebSocket も切断される）
//! - 異常系：パスワード不一致、満員、開始済みロビー
//! - エッジケース：既にメンバーのユーザーの再参加（パスワード不要・no-op）

use std::sync::Arc;

use raceway_shared::time::Clock;

use crate::{
    domain::{
        Lobby, LobbyEventPublisher, LobbyId, LobbyRepository, LobbyUpdateKind, PasswordHasher,
        Timestamp, UserId,
    },
    infrastructure::hub::LobbyRegistry,
};

use super::error::MembershipError;

/// 参加・退出のユースケース
pub struct MembershipUseCase {
    repository: Arc<dyn LobbyRepository>,
    registry: Arc<LobbyRegistry>,
    password_hasher: Arc<dyn PasswordHasher>,
    publisher: Arc<dyn LobbyEventPublisher>,
    clock: Arc<dyn Clock>,
}

impl MembershipUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        registry: Arc<LobbyRegistry>,
        password_hasher: Arc<dyn PasswordHasher>,
        publisher: Arc<dyn LobbyEventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            password_hasher,
            publisher,
            clock,
        }
    }

    /// ロビーに参加する
    ///
    /// # Arguments
    ///
    /// * `user_id` - 参加するユーザー
    /// * `lobby_id` - 参加先ロビーの ID（文字列）
    /// * `password` - パスワード付きロビーの場合に必要
    pub async fn join(
        &self,
        user_id: UserId,
        lobby_id: &str,
        password: Option<&str>,
    ) -> Result<Lobby, MembershipError> {
        let lobby_id = LobbyId::try_from(lobby_id)?;
        let lobby = self.repository.get_lobby(&lobby_id).await?;

        if !lobby.is_member(&user_id)
            && let Some(hash) = lobby.password_hash.as_deref()
        {
            let password = password.unwrap_or_default();
            if !self.password_hasher.verify_password(password, hash).await? {
                tracing::warn!(
                    "User '{}' sent a wrong password for lobby '{}'",
                    user_id,
                    lobby_id
                );
                return Err(MembershipError::WrongPassword);
            }
        }

        let lobby = self
            .repository
            .join_lobby(&lobby_id, user_id, self.now())
            .await?;

        tracing::info!(
            "User '{}' joined lobby '{}' ({}/{})",
            user_id,
            lobby_id,
            lobby.players.len(),
            lobby.max_players.value()
        );
        self.publisher
            .publish_lobby_update(LobbyUpdateKind::Updated, &lobby);

        Ok(lobby)
    }

    /// ロビーから退出する
    ///
    /// 接続中の WebSocket があれば切断します。
    pub async fn leave(&self, user_id: UserId, lobby_id: &str) -> Result<Lobby, MembershipError> {
        let lobby_id = LobbyId::try_from(lobby_id)?;
        let lobby = self
            .repository
            .leave_lobby(&lobby_id, &user_id, self.now())
            .await?;

        if let Some(connection) = self.registry.connection(&lobby_id, &user_id).await {
            self.registry.disconnect(&connection).await;
        }

        tracing::info!("User '{}' left lobby '{}'", user_id, lobby_id);
        self.publisher
            .publish_lobby_update(LobbyUpdateKind::Updated, &lobby);

        Ok(lobby)
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}
