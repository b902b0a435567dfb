use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use metron_common::{
    error::MetronResult,
    models::{NameFilter, SeriesType},
};
use metron_db::repository::series_types;
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/series_type", get(list_series_types))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// GET /api/v1/series_type
async fn list_series_types(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<NameFilter>,
) -> MetronResult<Json<Vec<SeriesType>>> {
    Ok(Json(series_types::list(&state.db.pool, &filter).await?))
}
