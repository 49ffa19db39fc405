//! Repository trait 定義
//!
//! ハブが必要とするロビー永続化のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::{Lobby, LobbyStatus},
    error::RepositoryError,
    value_object::{LobbyId, Timestamp, UserId},
};

/// Lobby Repository trait
///
/// `players` の参加・退出の整合性は Repository が保証します。
/// ハブ側のレジストリは「接続中」のクライアントのみを管理します。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LobbyRepository: Send + Sync {
    /// ロビーを保存
    async fn create_lobby(&self, lobby: &Lobby) -> Result<(), RepositoryError>;

    /// ロビーを取得
    async fn get_lobby(&self, id: &LobbyId) -> Result<Lobby, RepositoryError>;

    /// 全てのロビーを作成順で取得
    async fn get_all_lobbies(&self) -> Result<Vec<Lobby>, RepositoryError>;

    /// 公開・募集中・active のロビーを作成順で取得
    async fn get_open_lobbies(&self) -> Result<Vec<Lobby>, RepositoryError>;

    /// ステータスを更新し、更新後のロビーを返す
    async fn update_lobby_status(
        &self,
        id: &LobbyId,
        status: LobbyStatus,
        now: Timestamp,
    ) -> Result<Lobby, RepositoryError>;

    /// プレイヤーを追加し、更新後のロビーを返す
    async fn join_lobby(
        &self,
        id: &LobbyId,
        user_id: UserId,
        now: Timestamp,
    ) -> Result<Lobby, RepositoryError>;

    /// プレイヤーを削除し、更新後のロビーを返す
    async fn leave_lobby(
        &self,
        id: &LobbyId,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Lobby, RepositoryError>;

    /// ロビーを削除し、削除したロビーを返す
    async fn delete_lobby(&self, id: &LobbyId) -> Result<Lobby, RepositoryError>;
}
