//! Auth routes: password login and bearer-token identity.

use axum::Json;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, FromRef, State};
use axum::http::{StatusCode, header};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::models::{UserProfile, UserRole};
use crate::services::token::Claims;
use crate::services::users;
use crate::state::AppState;

pub const INVALID_CREDENTIALS: &str = "Incorrect username or password";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Verified token claims from the `Authorization: Bearer` header.
/// Use as a handler parameter to require authentication.
pub struct BearerUser {
    pub claims: Claims,
}

impl BearerUser {
    /// Reject unless the caller holds one of `roles`.
    ///
    /// # Errors
    ///
    /// Returns 403 when the role is not allowed.
    pub fn require_role(&self, roles: &[UserRole]) -> Result<(), ApiError> {
        if roles.contains(&self.claims.role) {
            Ok(())
        } else {
            Err(ApiError::new(StatusCode::FORBIDDEN, "Insufficient role"))
        }
    }
}

pub(crate) fn bearer_token(raw: &str) -> Option<&str> {
    let (scheme, token) = raw.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> axum::extract::FromRequestParts<S> for BearerUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        let app_state = AppState::from_ref(state);
        let claims = app_state.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            ApiError::unauthorized("Could not validate credentials")
        })?;

        Ok(Self { claims })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub role: UserRole,
}

/// `POST /api/v1/auth/token`: form login (`username`, `password`).
pub async fn issue_token(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Form(form) = form?;

    let limiter_key = users::normalize_email(&form.username).unwrap_or_else(|| form.username.trim().to_owned());
    if let Err(e) = state.login_limiter.check_and_record(&limiter_key) {
        tracing::warn!(username = %limiter_key, "login rate limited");
        return Err(ApiError::new(StatusCode::TOO_MANY_REQUESTS, e.to_string()));
    }

    let user = match users::authenticate(state.users.as_ref(), &form.username, &form.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::info!(username = %limiter_key, "login rejected");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
        Err(e) => {
            tracing::error!(error = %e, "credential check failed");
            return Err(ApiError::internal());
        }
    };

    let issued = state.tokens.issue(&user).map_err(|e| {
        tracing::error!(error = %e, "token issue failed");
        ApiError::internal()
    })?;

    tracing::info!(user_id = %user.id, role = %user.role, expires_at = issued.claims.exp, "login succeeded");
    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "bearer".to_owned(),
        expires_in: issued.expires_in,
        role: user.role,
    }))
}

/// `GET /api/v1/auth/me`: profile of the token holder.
pub async fn me(State(state): State<AppState>, auth: BearerUser) -> Result<Json<UserProfile>, ApiError> {
    let user = state.users.find_by_email(&auth.claims.sub).await.map_err(|e| {
        tracing::error!(error = %e, "user lookup failed");
        ApiError::internal()
    })?;

    match user {
        Some(user) if user.is_active && user.id == auth.claims.uid => Ok(Json(UserProfile::from(&user))),
        _ => Err(ApiError::unauthorized("Could not validate credentials")),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
