//! Credit roles (writer, penciller, cover, …). Read-only; seeded by migration.

use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use metron_common::{
    error::MetronResult,
    models::{NameFilter, Role},
};
use metron_db::repository::roles;
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/role", get(list_roles))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// GET /api/v1/role
async fn list_roles(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<NameFilter>,
) -> MetronResult<Json<Vec<Role>>> {
    Ok(Json(roles::list(&state.db.pool, &filter).await?))
}
