//! Home feed: the most recently edited issues, cached like the statistics.

use axum::{Json, Router, extract::State, middleware, routing::get};
use chrono::{DateTime, Utc};
use metron_common::{
    error::MetronResult,
    models::IssueListItem,
    statistics::{HomeResponse, RECENTLY_EDITED_LIMIT, keys},
};
use metron_db::repository::issues;
use std::sync::Arc;

use super::statistics::{Freshness, Loader};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/home", get(home))
        .route("/home/recently-edited", get(refresh_recently_edited))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

async fn feed(state: &AppState, freshness: Freshness) -> MetronResult<HomeResponse> {
    let loader = Loader::new(&state.db.cache, freshness);
    let pool = &state.db.pool;

    let update_time: DateTime<Utc> = loader
        .load(keys::HOME_UPDATED, || async { Ok(Utc::now()) })
        .await?;
    let recently_edited: Vec<IssueListItem> = loader
        .load(keys::RECENTLY_EDITED, move || async move {
            let rows = issues::recently_edited(pool, RECENTLY_EDITED_LIMIT).await?;
            Ok(rows.into_iter().map(IssueListItem::from).collect())
        })
        .await?;

    Ok(HomeResponse {
        update_time,
        recently_edited,
    })
}

/// GET /api/v1/home
async fn home(State(state): State<Arc<AppState>>) -> MetronResult<Json<HomeResponse>> {
    Ok(Json(feed(&state, Freshness::ReadThrough).await?))
}

/// GET /api/v1/home/recently-edited
async fn refresh_recently_edited(
    State(state): State<Arc<AppState>>,
) -> MetronResult<Json<HomeResponse>> {
    Ok(Json(feed(&state, Freshness::Refresh).await?))
}
