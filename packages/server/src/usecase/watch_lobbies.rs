//! UseCase: ロビー一覧の購読（SSE）
//!
//! 購読を先に登録してからスナップショットを取得します。その間に作成された
//! ロビーはスナップショットとライブイベントの両方に現れうるため、スナップショット
//! に含まれるロビーの `lobby_created` はここで読み捨てます。
//!
//! 読み捨て対象として覚えておくのは、購読開始の直前に作成されたロビーだけです。
//! それより古いロビーの `lobby_created` はすでに配信済みで、届くことはありません。

use std::{collections::HashSet, sync::Arc};

use raceway_shared::time::Clock;

use crate::{
    domain::{Lobby, LobbyId, LobbyRepository, LobbyUpdateKind},
    infrastructure::hub::{LobbyUpdate, SseSubscriberSet, SseSubscription},
};

use super::error::GetLobbyError;

/// 1 つの SSE クライアントに流すロビー一覧のフィード
pub struct LobbyFeed {
    snapshot: Vec<Lobby>,
    subscription: SseSubscription,
    /// スナップショット済みで、まだ `lobby_created` が届きうるロビー
    pending_created: HashSet<LobbyId>,
}

impl LobbyFeed {
    /// 接続時点のロビー一覧（作成順）。2 回目以降は空。
    pub fn take_snapshot(&mut self) -> Vec<Lobby> {
        std::mem::take(&mut self.snapshot)
    }

    /// 次のライブイベント。購読が外されると `None`。
    pub async fn next_update(&mut self) -> Option<Arc<LobbyUpdate>> {
        loop {
            let update = self.subscription.recv().await?;
            match update.kind {
                LobbyUpdateKind::Created if self.pending_created.remove(&update.lobby_id) => {
                    tracing::debug!(
                        "Skipping lobby_created for '{}' already sent in the snapshot",
                        update.lobby_id
                    );
                    continue;
                }
                LobbyUpdateKind::Deleted => {
                    self.pending_created.remove(&update.lobby_id);
                }
                _ => {}
            }
            return Some(update);
        }
    }
}

/// 作成から `lobby_created` の配信までにかかりうる時間の上限（ミリ秒）
const CREATED_EVENT_WINDOW_MILLIS: i64 = 30_000;

/// ロビー一覧購読のユースケース
pub struct WatchLobbiesUseCase {
    repository: Arc<dyn LobbyRepository>,
    subscribers: Arc<SseSubscriberSet>,
    clock: Arc<dyn Clock>,
}

impl WatchLobbiesUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        subscribers: Arc<SseSubscriberSet>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            subscribers,
            clock,
        }
    }

    /// 購読を開始する
    ///
    /// スナップショットの取得に失敗した場合、購読は破棄されます。
    pub async fn watch(&self) -> Result<LobbyFeed, GetLobbyError> {
        let created_after = self.clock.now_millis() - CREATED_EVENT_WINDOW_MILLIS;
        let subscription = self.subscribers.subscribe();
        let snapshot = self.repository.get_all_lobbies().await?;
        let pending_created = snapshot
            .iter()
            .filter(|lobby| lobby.created_at.value() >= created_after)
            .map(|lobby| lobby.id)
            .collect();

        Ok(LobbyFeed {
            snapshot,
            subscription,
            pending_created,
        })
    }
}
