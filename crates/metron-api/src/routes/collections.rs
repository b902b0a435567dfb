//! Collection routes. Everything is scoped to the caller; items owned by someone else
//! answer 404.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use chrono::Utc;
use metron_common::{
    error::{MetronError, MetronResult},
    models::{
        CollectionFilter, CollectionIssue, CollectionItem, CollectionItemResponse,
        CollectionListItem, CollectionStats, CreateCollectionItemRequest, MissingIssue,
        MissingSeries, ScrobbleRequest, ScrobbleResponse, UpdateCollectionItemRequest, UserRef,
    },
    pagination::Page,
    validation::validate_request,
};
use metron_db::repository::{collections, issues, series};
use std::sync::Arc;

use super::{PageQuery, found, page_request, paginate};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/collection", get(list_collection).post(create_item))
        .route("/collection/stats", get(stats))
        .route("/collection/missing_series", get(missing_series))
        .route("/collection/missing_issues/{series_id}", get(missing_issues))
        .route("/collection/scrobble", post(scrobble))
        .route(
            "/collection/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

async fn owned_issue(state: &AppState, issue_id: i64) -> MetronResult<CollectionIssue> {
    let row = found(issues::find_list_row(&state.db.pool, issue_id).await?, "Issue")?;
    Ok(CollectionIssue::from(row))
}

async fn respond(state: &AppState, auth: &AuthContext, item: CollectionItem) -> MetronResult<CollectionItemResponse> {
    let issue = owned_issue(state, item.issue_id).await?;
    let read_dates = collections::read_dates(&state.db.pool, item.id).await?;
    let user = UserRef {
        id: auth.user_id,
        username: auth.username.clone(),
    };
    Ok(CollectionItemResponse::new(item, user, issue, read_dates))
}

/// GET /api/v1/collection
async fn list_collection(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<CollectionFilter>,
) -> MetronResult<Json<Page<CollectionListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) = collections::list(&state.db.pool, auth.user_id, &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/collection/{id}
async fn get_item(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<CollectionItemResponse>> {
    let item = found(
        collections::find_for_user(&state.db.pool, id, auth.user_id).await?,
        "Collection item",
    )?;
    Ok(Json(respond(&state, &auth, item).await?))
}

/// POST /api/v1/collection
async fn create_item(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCollectionItemRequest>,
) -> MetronResult<(StatusCode, Json<CollectionItemResponse>)> {
    validate_request(&body)?;

    let item = collections::create(&state.db.pool, auth.user_id, &body).await?;
    tracing::info!(item_id = item.id, issue_id = item.issue_id, user_id = auth.user_id, "Collection item created");

    Ok((StatusCode::CREATED, Json(respond(&state, &auth, item).await?)))
}

/// PATCH /api/v1/collection/{id}
async fn update_item(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCollectionItemRequest>,
) -> MetronResult<Json<CollectionItemResponse>> {
    validate_request(&body)?;

    let item = found(
        collections::update(&state.db.pool, id, auth.user_id, &body).await?,
        "Collection item",
    )?;
    tracing::info!(item_id = id, user_id = auth.user_id, "Collection item updated");
    Ok(Json(respond(&state, &auth, item).await?))
}

/// DELETE /api/v1/collection/{id}
async fn delete_item(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<StatusCode> {
    if !collections::delete(&state.db.pool, id, auth.user_id).await? {
        return Err(MetronError::not_found("Collection item"));
    }
    tracing::info!(item_id = id, user_id = auth.user_id, "Collection item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/collection/stats
async fn stats(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> MetronResult<Json<CollectionStats>> {
    Ok(Json(collections::stats(&state.db.pool, auth.user_id).await?))
}

/// GET /api/v1/collection/missing_series
async fn missing_series(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> MetronResult<Json<Page<MissingSeries>>> {
    let request = page_request(query.page)?;
    let (rows, total) = collections::missing_series(&state.db.pool, auth.user_id, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/collection/missing_issues/{series_id}
async fn missing_issues(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(series_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> MetronResult<Json<Page<MissingIssue>>> {
    found(series::find_by_id(&state.db.pool, series_id).await?, "Series")?;
    let request = page_request(query.page)?;
    let (rows, total) =
        collections::missing_issues(&state.db.pool, auth.user_id, series_id, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// POST /api/v1/collection/scrobble
///
/// Marks an issue read, adding it to the collection first when needed (201) or
/// updating the owned item (200).
async fn scrobble(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScrobbleRequest>,
) -> MetronResult<(StatusCode, Json<ScrobbleResponse>)> {
    validate_request(&body)?;
    let issue = owned_issue(&state, body.issue_id).await?;

    let date_read = body.date_read.unwrap_or_else(Utc::now);
    let (item, created) =
        collections::scrobble(&state.db.pool, auth.user_id, body.issue_id, date_read, body.rating)
            .await?;
    tracing::info!(item_id = item.id, issue_id = body.issue_id, created, user_id = auth.user_id, "Issue scrobbled");

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(ScrobbleResponse {
            id: item.id,
            issue,
            is_read: item.is_read,
            date_read: item.date_read,
            rating: item.rating,
            created,
            modified: item.modified,
        }),
    ))
}
