//! UseCase 層
//!
//! ロビーのライフサイクル操作とリアルタイム配信（WebSocket / SSE）の入口を
//! 提供します。UI 層のハンドラーはここを経由してドメインとハブを操作します。

mod change_lobby_status;
mod create_lobby;
pub mod error;
mod get_lobbies;
mod lobby_session;
mod membership;
mod watch_lobbies;

pub use change_lobby_status::ChangeLobbyStatusUseCase;
pub use create_lobby::{CreateLobbyInput, CreateLobbyUseCase};
pub use error::{
    ChangeLobbyStatusError, ConnectMemberError, CreateLobbyError, GetLobbyError, MembershipError,
};
pub use get_lobbies::GetLobbiesUseCase;
pub use lobby_session::{LobbySessionUseCase, MemberSession, RelayOutcome};
pub use membership::MembershipUseCase;
pub use watch_lobbies::{LobbyFeed, WatchLobbiesUseCase};
