//! UseCase: ロビーの WebSocket セッション
//!
//! ## 責務
//!
//! - 接続：アクセストークンを検証し、Connection を作成してレジストリに登録する
//!   （同じユーザーの古い接続は切断される）
//! - 中継：受信したテキストフレームを type ごとに振り分ける
//!   - `ping` → 送信者自身のメールボックスに `{"type":"pong"}`
//!   - `chat` → ロビー全員（送信者を含む）にそのままブロードキャスト
//!   - それ以外・パース不能 → そのままブロードキャスト（accept-and-forward）
//! - 切断：1 接続につき 1 回だけ実行される
//!
//! ## テスト実装の作業記録
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続・再接続による置き換え・ping / chat / 未知の type の中継
//! - 異常系：トークン不正（接続は作成されない）、不正なロビー ID、存在しないロビー
//! - 競合：接続処理の途中でロビーが削除された場合、接続は残らない

use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;

use crate::{
    domain::{AuthError, LobbyId, LobbyRepository, TokenValidator, UserClaims},
    infrastructure::{
        dto::websocket::{InboundKind, PongMessage},
        hub::{BroadcastReport, Connection, LobbyRegistry, Mailbox},
    },
};

use super::error::ConnectMemberError;

/// 認証済みで登録まで終わった接続
pub struct MemberSession {
    pub claims: UserClaims,
    pub connection: Arc<Connection>,
    /// Write Pump が読み出すメールボックス
    pub mailbox: Mailbox,
}

/// 受信フレームの処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// pong を自分のメールボックスに積んだ（積めなかった場合は `false`、接続は切断済み）
    Ponged(bool),
    Broadcast(BroadcastReport),
}

/// WebSocket セッションのユースケース
pub struct LobbySessionUseCase {
    repository: Arc<dyn LobbyRepository>,
    token_validator: Arc<dyn TokenValidator>,
    registry: Arc<LobbyRegistry>,
    mailbox_capacity: usize,
}

impl LobbySessionUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        token_validator: Arc<dyn TokenValidator>,
        registry: Arc<LobbyRegistry>,
        mailbox_capacity: usize,
    ) -> Self {
        Self {
            repository,
            token_validator,
            registry,
            mailbox_capacity: mailbox_capacity.max(1),
        }
    }

    /// 接続を実行
    ///
    /// # Arguments
    ///
    /// * `token` - Cookie または Authorization ヘッダーから取り出したアクセストークン
    /// * `lobby_id` - 接続先ロビーの ID（文字列）
    ///
    /// # Returns
    ///
    /// * `Ok(MemberSession)` - 登録済みの接続とメールボックス
    /// * `Err(ConnectMemberError)` - 認証失敗・ロビー不正（接続は作成されない）
    pub async fn connect(
        &self,
        token: Option<&str>,
        lobby_id: &str,
    ) -> Result<MemberSession, ConnectMemberError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let claims = self.token_validator.validate_access_token(token)?;
        let lobby_id = LobbyId::try_from(lobby_id)?;
        self.repository.get_lobby(&lobby_id).await?;

        let (connection, mailbox) =
            Connection::new(claims.user_id, lobby_id, self.mailbox_capacity);
        if let Some(replaced) = self.registry.register(connection.clone()).await {
            tracing::info!(
                "User '{}' reconnected to lobby '{}', closing connection {}",
                claims.user_id,
                lobby_id,
                replaced.id().value()
            );
            self.registry.disconnect(&replaced).await;
        }

        // ロビーが確認後に削除されていた場合、削除側の一斉切断をすり抜けた接続を取り消す
        if let Err(e) = self.repository.get_lobby(&lobby_id).await {
            tracing::info!(
                "Lobby '{}' went away while user '{}' was connecting",
                lobby_id,
                claims.user_id
            );
            self.registry.disconnect(&connection).await;
            return Err(e.into());
        }

        tracing::info!(
            "User '{}' connected to lobby '{}' ({} online)",
            claims.user_id,
            lobby_id,
            self.registry.member_count(&lobby_id).await
        );

        Ok(MemberSession {
            claims,
            connection,
            mailbox,
        })
    }

    /// 受信したテキストフレームを処理
    pub async fn relay(&self, connection: &Arc<Connection>, frame: Utf8Bytes) -> RelayOutcome {
        match InboundKind::classify(frame.as_str()) {
            InboundKind::Ping => {
                let pong = match serde_json::to_string(&PongMessage::new()) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to serialize pong: {}", e);
                        return RelayOutcome::Ponged(false);
                    }
                };
                RelayOutcome::Ponged(self.registry.send_to(connection, pong.into()).await)
            }
            InboundKind::Chat => {
                tracing::debug!(
                    "Chat from user '{}' in lobby '{}'",
                    connection.user_id(),
                    connection.lobby_id()
                );
                RelayOutcome::Broadcast(self.broadcast(connection, frame).await)
            }
            InboundKind::Unknown(kind) => {
                tracing::warn!(
                    "Unknown message type '{}' from user '{}', forwarding as is",
                    kind,
                    connection.user_id()
                );
                RelayOutcome::Broadcast(self.broadcast(connection, frame).await)
            }
            InboundKind::Unparseable => {
                tracing::debug!(
                    "Unparseable frame from user '{}', forwarding as is",
                    connection.user_id()
                );
                RelayOutcome::Broadcast(self.broadcast(connection, frame).await)
            }
        }
    }

    /// 切断を実行（冪等）
    pub async fn disconnect(&self, connection: &Arc<Connection>) -> bool {
        self.registry.disconnect(connection).await
    }

    async fn broadcast(&self, connection: &Arc<Connection>, frame: Utf8Bytes) -> BroadcastReport {
        let report = self
            .registry
            .broadcast(&connection.lobby_id(), frame)
            .await;
        for user_id in &report.disconnected {
            tracing::warn!(
                "Dropped user '{}' from lobby '{}' during broadcast",
                user_id,
                connection.lobby_id()
            );
        }
        report
    }
}
