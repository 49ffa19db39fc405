//! Domain layer: entities, value objects and the interfaces the hub needs
//! from its collaborators.

pub mod auth;
pub mod entity;
pub mod error;
pub mod event;
pub mod repository;
pub mod value_object;

pub use auth::{PasswordHasher, Role, TokenValidator, UserClaims};
pub use entity::{Lobby, LobbyStatus};
pub use error::{AuthError, LobbyError, PasswordError, RepositoryError, ValueObjectError};
pub use event::{LobbyEventPublisher, LobbyUpdateKind};
pub use repository::LobbyRepository;
pub use value_object::{LobbyId, LobbyName, MaxPlayers, Timestamp, UserId};
