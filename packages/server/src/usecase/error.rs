//! UseCase 層のエラー定義
//!
//! UseCase ごとに 1 つの enum を持ち、UI 層で HTTP ステータスに変換します。

use thiserror::Error;

use crate::domain::{AuthError, LobbyError, PasswordError, RepositoryError, ValueObjectError};

/// ロビー作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateLobbyError {
    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

/// ロビー取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetLobbyError {
    #[error(transparent)]
    InvalidLobbyId(#[from] ValueObjectError),

    #[error("lobby not found")]
    NotFound,

    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

/// ステータス変更（開始・終了・削除）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeLobbyStatusError {
    #[error(transparent)]
    InvalidLobbyId(#[from] ValueObjectError),

    #[error("lobby not found")]
    NotFound,

    #[error("only the lobby owner can do this")]
    NotOwner,

    #[error(transparent)]
    Rejected(LobbyError),

    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

/// 参加・退出のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    #[error(transparent)]
    InvalidLobbyId(#[from] ValueObjectError),

    #[error("lobby not found")]
    NotFound,

    #[error("wrong lobby password")]
    WrongPassword,

    #[error(transparent)]
    Rejected(LobbyError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

/// WebSocket 接続のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectMemberError {
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error(transparent)]
    InvalidLobbyId(#[from] ValueObjectError),

    #[error("lobby not found")]
    NotFound,

    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CreateLobbyError {
    fn from(e: RepositoryError) -> Self {
        Self::Repository(e)
    }
}

impl From<RepositoryError> for GetLobbyError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::LobbyNotFound(_) => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

impl From<RepositoryError> for ChangeLobbyStatusError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::LobbyNotFound(_) => Self::NotFound,
            RepositoryError::Rejected(rule) => Self::Rejected(rule),
            other => Self::Repository(other),
        }
    }
}

impl From<RepositoryError> for MembershipError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::LobbyNotFound(_) => Self::NotFound,
            RepositoryError::Rejected(rule) => Self::Rejected(rule),
            other => Self::Repository(other),
        }
    }
}

impl From<RepositoryError> for ConnectMemberError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::LobbyNotFound(_) => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_are_classified() {
        // テスト項目: Repository のエラーが UseCase ごとのエラーに振り分けられる
        // given (前提条件):
        let not_found = RepositoryError::LobbyNotFound("x".to_string());
        let full = RepositoryError::Rejected(LobbyError::Full(2));

        // when (操作) / then (期待する結果):
        assert_eq!(GetLobbyError::from(not_found.clone()), GetLobbyError::NotFound);
        assert_eq!(
            MembershipError::from(full.clone()),
            MembershipError::Rejected(LobbyError::Full(2))
        );
        assert_eq!(
            ChangeLobbyStatusError::from(not_found.clone()),
            ChangeLobbyStatusError::NotFound
        );
        assert_eq!(
            ConnectMemberError::from(full.clone()),
            ConnectMemberError::Repository(full)
        );
    }
}
