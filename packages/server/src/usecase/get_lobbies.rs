//! UseCase: ロビー取得処理（単体・全件・募集中一覧）

use std::sync::Arc;

use crate::domain::{Lobby, LobbyId, LobbyRepository};

use super::error::GetLobbyError;

/// ロビー取得のユースケース
pub struct GetLobbiesUseCase {
    repository: Arc<dyn LobbyRepository>,
}

impl GetLobbiesUseCase {
    pub fn new(repository: Arc<dyn LobbyRepository>) -> Self {
        Self { repository }
    }

    /// ID を指定してロビーを取得
    pub async fn get(&self, lobby_id: &str) -> Result<Lobby, GetLobbyError> {
        let lobby_id = LobbyId::try_from(lobby_id)?;
        Ok(self.repository.get_lobby(&lobby_id).await?)
    }

    /// 全てのロビーを作成順で取得
    pub async fn all(&self) -> Result<Vec<Lobby>, GetLobbyError> {
        Ok(self.repository.get_all_lobbies().await?)
    }

    /// 公開・募集中・active のロビーを作成順で取得
    pub async fn open(&self) -> Result<Vec<Lobby>, GetLobbyError> {
        Ok(self.repository.get_open_lobbies().await?)
    }
}
