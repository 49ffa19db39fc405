//! Error to HTTP response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    domain::AuthError,
    infrastructure::dto::http::ApiResponse,
    usecase::{
        ChangeLobbyStatusError, ConnectMemberError, CreateLobbyError, GetLobbyError,
        MembershipError,
    },
};

/// Errors returned by HTTP handlers, rendered as the JSON envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn internal(e: impl std::fmt::Display) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(detail) = &self {
            tracing::error!("Request failed: {}", detail);
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Unauthorized(e.to_string())
    }
}

impl From<CreateLobbyError> for ApiError {
    fn from(e: CreateLobbyError) -> Self {
        match e {
            CreateLobbyError::InvalidInput(_) => ApiError::BadRequest(e.to_string()),
            CreateLobbyError::Password(_) | CreateLobbyError::Repository(_) => {
                ApiError::internal(e)
            }
        }
    }
}

impl From<GetLobbyError> for ApiError {
    fn from(e: GetLobbyError) -> Self {
        match e {
            GetLobbyError::InvalidLobbyId(_) => ApiError::BadRequest(e.to_string()),
            GetLobbyError::NotFound => ApiError::NotFound(e.to_string()),
            GetLobbyError::Repository(_) => ApiError::internal(e),
        }
    }
}

impl From<ChangeLobbyStatusError> for ApiError {
    fn from(e: ChangeLobbyStatusError) -> Self {
        match e {
            ChangeLobbyStatusError::InvalidLobbyId(_) => ApiError::BadRequest(e.to_string()),
            ChangeLobbyStatusError::NotFound => ApiError::NotFound(e.to_string()),
            ChangeLobbyStatusError::NotOwner => ApiError::Forbidden(e.to_string()),
            ChangeLobbyStatusError::Rejected(_) => ApiError::Conflict(e.to_string()),
            ChangeLobbyStatusError::Repository(_) => ApiError::internal(e),
        }
    }
}

impl From<MembershipError> for ApiError {
    fn from(e: MembershipError) -> Self {
        match e {
            MembershipError::InvalidLobbyId(_) => ApiError::BadRequest(e.to_string()),
            MembershipError::NotFound => ApiError::NotFound(e.to_string()),
            MembershipError::WrongPassword => ApiError::Forbidden(e.to_string()),
            MembershipError::Rejected(_) => ApiError::Conflict(e.to_string()),
            MembershipError::Password(_) | MembershipError::Repository(_) => ApiError::internal(e),
        }
    }
}

impl From<ConnectMemberError> for ApiError {
    fn from(e: ConnectMemberError) -> Self {
        match e {
            ConnectMemberError::Unauthorized(auth) => auth.into(),
            ConnectMemberError::InvalidLobbyId(_) => ApiError::BadRequest(e.to_string()),
            ConnectMemberError::NotFound => ApiError::NotFound(e.to_string()),
            ConnectMemberError::Repository(_) => ApiError::internal(e),
        }
    }
}
