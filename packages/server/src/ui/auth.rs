//! Access token extraction.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::domain::{AuthError, UserClaims};

use super::{error::ApiError, state::AppState};

const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Access token from the `access_token` cookie, falling back to an
/// `Authorization: Bearer` header.
pub fn access_token(headers: &HeaderMap) -> Option<&str> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .into_iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == ACCESS_TOKEN_COOKIE && !value.is_empty()).then_some(value)
        });

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    })
}

/// Authenticated caller of an HTTP endpoint.
pub struct AuthUser(pub UserClaims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = state.token_validator.validate_access_token(token)?;
        Ok(Self(claims))
    }
}
