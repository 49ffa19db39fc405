//! HS256 access token validation.

use std::time::Duration;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use raceway_shared::time::get_utc_timestamp;
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, Role, TokenValidator, UserClaims, UserId};

/// Access token TTL used when none is configured
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    /// user id
    sub: String,
    /// expiry, seconds since the Unix epoch
    exp: u64,
    #[serde(default)]
    roles: Vec<String>,
}

pub struct JwtTokenValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl JwtTokenValidator {
    pub fn new(secret: &[u8], access_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            access_ttl,
        }
    }

    /// Sign an access token for `claims`.
    ///
    /// The server never calls this: login and refresh belong to the external
    /// auth service, which signs with the same secret and claim layout. It is
    /// public for tests and tooling that need tokens this validator accepts.
    pub fn issue_access_token(&self, claims: &UserClaims) -> Result<String, AuthError> {
        let now_secs = u64::try_from(get_utc_timestamp() / 1000).unwrap_or_default();
        let access_claims = AccessClaims {
            sub: claims.user_id.to_string(),
            exp: now_secs + self.access_ttl.as_secs(),
            roles: claims
                .roles
                .iter()
                .map(|role| role.as_str().to_string())
                .collect(),
        };
        encode(&Header::new(Algorithm::HS256), &access_claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign access token: {}", e);
            AuthError::InvalidToken
        })
    }
}

impl TokenValidator for JwtTokenValidator {
    fn validate_access_token(&self, token: &str) -> Result<UserClaims, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            },
        )?;

        let user_id =
            UserId::try_from(data.claims.sub.as_str()).map_err(|_| AuthError::InvalidToken)?;
        let roles = data
            .claims
            .roles
            .iter()
            .filter_map(|role| Role::parse(role))
            .collect();

        Ok(UserClaims { user_id, roles })
    }
}
