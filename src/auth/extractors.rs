use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use tracing::warn;

use crate::auth::claims::Claims;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;

/// Pulls the token out of `Authorization: Bearer <token>`. An absent or
/// malformed header yields the empty string, which verification rejects.
pub fn bearer_token(headers: &HeaderMap) -> &str {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .unwrap_or("")
}

/// The single authentication predicate. Every protected path, whether it
/// runs before the handler (extractors below) or inside it (post
/// update/delete, where existence is checked first), goes through here.
pub fn authenticate(keys: &JwtKeys, headers: &HeaderMap) -> Result<Claims, ApiError> {
    keys.verify(bearer_token(headers)).map_err(|e| {
        warn!(reason = %e, "request rejected by token check");
        ApiError::unauthorized()
    })
}

/// Requirement "authenticated": any valid token.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        authenticate(&keys, &parts.headers).map(AuthUser)
    }
}

/// Requirement "role: admin": a valid token whose role claim is admin.
pub struct Admin(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let claims = authenticate(&keys, &parts.headers)?;
        if !claims.role.is_admin() {
            return Err(ApiError::Forbidden("Forbidden: Admins only".into()));
        }
        Ok(Admin(claims))
    }
}
