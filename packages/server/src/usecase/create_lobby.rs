//! UseCase: ロビー作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateLobbyUseCase::execute() メソッド
//! - 入力検証、パスワードのハッシュ化、保存、`lobby_created` の配信
//!
//! ### どのような状況を想定しているか
//! - 正常系：公開ロビー / パスワード付き非公開ロビーの作成
//! - 異常系：不正な名前・人数、保存失敗（イベントは配信されない）
//! - エッジケース：公開ロビーにパスワードが渡された場合（ハッシュ化しない）

use std::sync::Arc;

use raceway_shared::time::Clock;

use crate::domain::{
    Lobby, LobbyEventPublisher, LobbyId, LobbyName, LobbyRepository, LobbyUpdateKind, MaxPlayers,
    PasswordHasher, Timestamp, UserId,
};

use super::error::CreateLobbyError;

/// ロビー作成の入力（UI 層の DTO から組み立てる）
#[derive(Debug, Clone)]
pub struct CreateLobbyInput {
    pub name: String,
    pub is_public: bool,
    pub password: Option<String>,
    pub max_players: i64,
}

/// ロビー作成のユースケース
pub struct CreateLobbyUseCase {
    repository: Arc<dyn LobbyRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    publisher: Arc<dyn LobbyEventPublisher>,
    clock: Arc<dyn Clock>,
}

impl CreateLobbyUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        publisher: Arc<dyn LobbyEventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            password_hasher,
            publisher,
            clock,
        }
    }

    /// ロビー作成を実行
    ///
    /// # Arguments
    ///
    /// * `owner_id` - 認証済みユーザー（ロビーの所有者になり、唯一のメンバーになる）
    /// * `input` - 作成パラメータ
    ///
    /// # Returns
    ///
    /// * `Ok(Lobby)` - 保存したロビー
    /// * `Err(CreateLobbyError)` - 入力不正または保存失敗
    pub async fn execute(
        &self,
        owner_id: UserId,
        input: CreateLobbyInput,
    ) -> Result<Lobby, CreateLobbyError> {
        let name = LobbyName::new(input.name)?;
        let max_players = MaxPlayers::new(input.max_players)?;

        // 非公開かつ空でないパスワードのときだけハッシュを保存する
        let password_hash = match input.password.as_deref() {
            Some(password) if !input.is_public && !password.is_empty() => {
                Some(self.password_hasher.hash_password(password).await?)
            }
            _ => None,
        };

        let lobby = Lobby::new(
            LobbyId::generate(),
            name,
            owner_id,
            input.is_public,
            password_hash,
            max_players,
            Timestamp::new(self.clock.now_millis()),
        );
        self.repository.create_lobby(&lobby).await?;

        tracing::info!(
            "Lobby '{}' ({}) created by user '{}'",
            lobby.name.as_str(),
            lobby.id,
            owner_id
        );
        self.publisher
            .publish_lobby_update(LobbyUpdateKind::Created, &lobby);

        Ok(lobby)
    }
}
