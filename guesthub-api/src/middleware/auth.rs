use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use guesthub_core::Caller;

use crate::{error::AppError, state::AppState};

// ============================================================================
// Bearer Token Extractors
// ============================================================================

/// A caller whose bearer token verified. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Caller);

/// `None` unless a bearer token was sent and verified.
///
/// A missing, malformed or expired token downgrades the request to anonymous
/// instead of rejecting it. Never fails.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Caller>);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // 1. Extract token from Authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::AuthenticationError("Missing or malformed bearer token".to_string()))?;

        // 2. Decode and validate JWT
        let claims = state.auth.tokens().verify(bearer.token()).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            AppError::from(e)
        })?;

        Ok(AuthUser(claims.caller()))
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(MaybeAuthUser(None));
        }
        match AuthUser::from_request_parts(parts, state).await {
            Ok(AuthUser(caller)) => Ok(MaybeAuthUser(Some(caller))),
            Err(e) => {
                tracing::debug!(error = %e, "Unusable bearer token, continuing anonymously");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}
