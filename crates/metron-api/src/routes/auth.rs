//! Authentication routes: login and token refresh.
//!
//! Accounts are created by staff through `metron create-user`; there is no signup flow.

use axum::{Json, Router, extract::State, routing::post};
use metron_common::{
    error::{MetronError, MetronResult},
    models::{LoginRequest, UserResponse},
    validation::validate_request,
};
use metron_db::repository::users;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    AppState,
    auth::{self, TokenPair},
};

/// Auth router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
}

#[derive(Serialize)]
struct AuthResponse {
    user: UserResponse,
    #[serde(flatten)]
    tokens: TokenPair,
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

fn issue_tokens(user_id: i64, username: &str, flags: i64) -> MetronResult<TokenPair> {
    let config = metron_common::config::get();
    auth::generate_token_pair(
        user_id,
        username,
        flags,
        &config.auth.jwt_secret,
        config.auth.access_token_ttl_secs,
        config.auth.refresh_token_ttl_secs,
    )
    .map_err(|e| MetronError::Internal(e.into()))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns JWT tokens.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> MetronResult<Json<AuthResponse>> {
    validate_request(&body)?;

    let user = users::find_by_username(&state.db.pool, &body.username)
        .await?
        .ok_or(MetronError::InvalidCredentials)?;

    let valid = auth::verify_password(&body.password, &user.password_hash)
        .map_err(|_| MetronError::InvalidCredentials)?;
    if !valid {
        return Err(MetronError::InvalidCredentials);
    }

    if !user.is_active() {
        return Err(MetronError::Forbidden);
    }

    let tokens = issue_tokens(user.id, &user.username, user.flags)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens,
    }))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new token pair carrying the account's current flags.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> MetronResult<Json<TokenPair>> {
    let config = metron_common::config::get();

    let claims = auth::validate_token(&body.refresh_token, &config.auth.jwt_secret)
        .map_err(|_| MetronError::InvalidToken)?;
    if claims.token_type != auth::REFRESH {
        return Err(MetronError::InvalidToken);
    }

    let user_id: i64 = claims.sub.parse().map_err(|_| MetronError::InvalidToken)?;
    let user = users::find_by_id(&state.db.pool, user_id)
        .await?
        .ok_or(MetronError::InvalidToken)?;
    if !user.is_active() {
        return Err(MetronError::Forbidden);
    }

    Ok(Json(issue_tokens(user.id, &user.username, user.flags)?))
}
