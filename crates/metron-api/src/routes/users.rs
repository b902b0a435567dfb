//! User routes.

use axum::{
    Json, Router,
    extract::{Extension, State},
    middleware,
    routing::get,
};
use metron_common::{error::MetronResult, models::UserResponse};
use metron_db::repository::users;
use std::sync::Arc;

use super::found;
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/@me", get(get_current_user))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// GET /api/v1/users/@me: the authenticated account.
async fn get_current_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> MetronResult<Json<UserResponse>> {
    let user = found(users::find_by_id(&state.db.pool, auth.user_id).await?, "User")?;
    Ok(Json(user.into()))
}
