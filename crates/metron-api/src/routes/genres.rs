use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use metron_common::{
    error::MetronResult,
    models::{Genre, NameFilter},
};
use metron_db::repository::genres;
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/genre", get(list_genres))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// GET /api/v1/genre
async fn list_genres(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<NameFilter>,
) -> MetronResult<Json<Vec<Genre>>> {
    Ok(Json(genres::list(&state.db.pool, &filter).await?))
}
