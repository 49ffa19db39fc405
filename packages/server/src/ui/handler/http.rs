//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::Lobby,
    infrastructure::dto::http::{ApiResponse, CreateLobbyRequest, JoinLobbyRequest, LobbyDto},
    ui::{auth::AuthUser, error::ApiError, state::AppState},
    usecase::CreateLobbyInput,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn lobby_response(lobby: &Lobby) -> Json<ApiResponse<LobbyDto>> {
    Json(ApiResponse::ok(LobbyDto::from(lobby)))
}

fn lobbies_response(lobbies: &[Lobby]) -> Json<ApiResponse<Vec<LobbyDto>>> {
    Json(ApiResponse::ok(lobbies.iter().map(LobbyDto::from).collect()))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a lobby owned by the caller
pub async fn create_lobby(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(request): Json<CreateLobbyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LobbyDto>>), ApiError> {
    let input = CreateLobbyInput {
        name: request.name,
        is_public: request.is_public,
        password: request.password,
        max_players: request.max_players,
    };
    let lobby = state
        .create_lobby_usecase
        .execute(claims.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, lobby_response(&lobby)))
}

/// Get list of all lobbies
pub async fn list_lobbies(State(state): State<Arc<AppState>>) -> ApiResult<Vec<LobbyDto>> {
    let lobbies = state.get_lobbies_usecase.all().await?;
    Ok(lobbies_response(&lobbies))
}

/// Get list of public lobbies accepting players
pub async fn list_open_lobbies(State(state): State<Arc<AppState>>) -> ApiResult<Vec<LobbyDto>> {
    let lobbies = state.get_lobbies_usecase.open().await?;
    Ok(lobbies_response(&lobbies))
}

/// Get lobby detail by ID
pub async fn get_lobby(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
) -> ApiResult<LobbyDto> {
    let lobby = state.get_lobbies_usecase.get(&lobby_id).await?;
    Ok(lobby_response(&lobby))
}

/// Join a lobby. The body is optional and only needed for password
/// protected lobbies.
pub async fn join_lobby(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(lobby_id): Path<String>,
    body: Bytes,
) -> ApiResult<LobbyDto> {
    let request = if body.is_empty() {
        JoinLobbyRequest::default()
    } else {
        serde_json::from_slice::<JoinLobbyRequest>(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid request body: {}", e)))?
    };
    let lobby = state
        .membership_usecase
        .join(claims.user_id, &lobby_id, request.password.as_deref())
        .await?;
    Ok(lobby_response(&lobby))
}

/// Leave a lobby
pub async fn leave_lobby(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(lobby_id): Path<String>,
) -> ApiResult<LobbyDto> {
    let lobby = state
        .membership_usecase
        .leave(claims.user_id, &lobby_id)
        .await?;
    Ok(lobby_response(&lobby))
}

/// Start the game (owner only)
pub async fn start_lobby(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(lobby_id): Path<String>,
) -> ApiResult<LobbyDto> {
    let lobby = state
        .change_lobby_status_usecase
        .start(&claims, &lobby_id)
        .await?;
    Ok(lobby_response(&lobby))
}

/// Close the lobby (owner only)
pub async fn close_lobby(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(lobby_id): Path<String>,
) -> ApiResult<LobbyDto> {
    let lobby = state
        .change_lobby_status_usecase
        .close(&claims, &lobby_id)
        .await?;
    Ok(lobby_response(&lobby))
}

/// Delete the lobby and disconnect its live members (owner only)
pub async fn delete_lobby(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(lobby_id): Path<String>,
) -> ApiResult<LobbyDto> {
    let lobby = state
        .change_lobby_status_usecase
        .delete(&claims, &lobby_id)
        .await?;
    Ok(lobby_response(&lobby))
}
