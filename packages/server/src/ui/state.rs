//! Shared application state.

use std::sync::Arc;

use raceway_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    domain::{LobbyEventPublisher, LobbyRepository, PasswordHasher, TokenValidator},
    infrastructure::{
        auth::{Argon2PasswordHasher, JwtTokenValidator},
        hub::{LobbyRegistry, LobbyUpdateBroadcaster, SseSubscriberSet},
        repository::InMemoryLobbyRepository,
    },
    usecase::{
        ChangeLobbyStatusUseCase, CreateLobbyUseCase, GetLobbiesUseCase, LobbySessionUseCase,
        MembershipUseCase, WatchLobbiesUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// TokenValidator（HTTP API の認証に使用）
    pub token_validator: Arc<dyn TokenValidator>,
    pub get_lobbies_usecase: Arc<GetLobbiesUseCase>,
    pub create_lobby_usecase: Arc<CreateLobbyUseCase>,
    pub membership_usecase: Arc<MembershipUseCase>,
    pub change_lobby_status_usecase: Arc<ChangeLobbyStatusUseCase>,
    pub lobby_session_usecase: Arc<LobbySessionUseCase>,
    pub watch_lobbies_usecase: Arc<WatchLobbiesUseCase>,
}

impl AppState {
    /// Wire the in-memory stack.
    ///
    /// Dependencies are created in order:
    /// 1. Repository and auth collaborators
    /// 2. Hub (lobby registry, SSE subscribers, broadcaster)
    /// 3. UseCases
    pub fn from_config(config: &ServerConfig) -> Self {
        // 1. Repository and auth collaborators
        let repository: Arc<dyn LobbyRepository> = Arc::new(InMemoryLobbyRepository::new());
        let token_validator: Arc<dyn TokenValidator> = Arc::new(JwtTokenValidator::new(
            config.jwt_access_secret.as_bytes(),
            config.access_ttl,
        ));
        let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // 2. Hub
        let registry = Arc::new(LobbyRegistry::new());
        let subscribers = SseSubscriberSet::new(config.sse_buffer);
        let publisher: Arc<dyn LobbyEventPublisher> =
            Arc::new(LobbyUpdateBroadcaster::new(subscribers.clone()));

        // 3. UseCases
        Self {
            get_lobbies_usecase: Arc::new(GetLobbiesUseCase::new(repository.clone())),
            create_lobby_usecase: Arc::new(CreateLobbyUseCase::new(
                repository.clone(),
                password_hasher.clone(),
                publisher.clone(),
                clock.clone(),
            )),
            membership_usecase: Arc::new(MembershipUseCase::new(
                repository.clone(),
                registry.clone(),
                password_hasher,
                publisher.clone(),
                clock.clone(),
            )),
            change_lobby_status_usecase: Arc::new(ChangeLobbyStatusUseCase::new(
                repository.clone(),
                registry.clone(),
                publisher,
                clock.clone(),
            )),
            lobby_session_usecase: Arc::new(LobbySessionUseCase::new(
                repository.clone(),
                token_validator.clone(),
                registry,
                config.mailbox_capacity,
            )),
            watch_lobbies_usecase: Arc::new(WatchLobbiesUseCase::new(
                repository,
                subscribers,
                clock,
            )),
            token_validator,
        }
    }
}
