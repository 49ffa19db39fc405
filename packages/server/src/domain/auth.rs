//! Authentication collaborators.
//!
//! Token issuance lives outside the hub; the hub only validates access
//! tokens and checks lobby passwords.

use async_trait::async_trait;

use super::{
    error::{AuthError, PasswordError},
    value_object::UserId,
};

/// User role carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Parse a role claim. Unknown roles are dropped by the caller.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

/// Claims extracted from a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserClaims {
    pub user_id: UserId,
    pub roles: Vec<Role>,
}

impl UserClaims {
    pub fn is_admin(&self) -> bool {
        self.roles
            .iter()
            .any(|role| matches!(role, Role::Admin | Role::SuperAdmin))
    }
}

/// Access token validation.
#[cfg_attr(test, mockall::automock)]
pub trait TokenValidator: Send + Sync {
    /// Validate an access token and return its claims.
    fn validate_access_token(&self, token: &str) -> Result<UserClaims, AuthError>;
}

/// Lobby password hashing.
///
/// Implementations are CPU heavy and must not block the async runtime.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, PasswordError>;

    /// Returns `Ok(false)` on mismatch; errors only on a malformed hash.
    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}
