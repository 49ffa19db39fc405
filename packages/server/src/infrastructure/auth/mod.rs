//! Authentication collaborators: access token validation and lobby
//! password hashing.

pub mod jwt;
pub mod password;

pub use jwt::JwtTokenValidator;
pub use password::Argon2PasswordHasher;
