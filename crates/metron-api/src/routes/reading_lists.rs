//! Reading list routes. Lists outside the caller's view are 404; lists the caller can
//! see but not manage are 403 on writes.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get},
};
use metron_common::{
    error::{MetronError, MetronResult},
    models::{
        AddItemsRequest, AddedItems, CreateReadingListRequest, ReadingList, ReadingListFilter,
        ReadingListItemResponse, ReadingListListItem, ReadingListResponse, UpdateReadingListRequest,
        append_positions,
    },
    pagination::Page,
    slug::name_slug,
    validation::{validate_name, validate_request},
};
use metron_db::repository::reading_lists;
use std::sync::Arc;

use super::{PageQuery, found, page_request, paginate, resolve_slug};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reading_list", get(list_reading_lists).post(create_reading_list))
        .route(
            "/reading_list/{id}",
            get(get_reading_list)
                .patch(update_reading_list)
                .delete(delete_reading_list),
        )
        .route("/reading_list/{id}/items", get(list_items).post(add_items))
        .route("/reading_list/{id}/items/{issue_id}", delete(remove_item))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// The list if the caller may see it.
async fn visible(state: &AppState, auth: &AuthContext, id: i64) -> MetronResult<ReadingList> {
    let list = found(reading_lists::find_by_id(&state.db.pool, id).await?, "Reading list")?;
    if list.visible_to(auth.user_id, auth.is_staff()) {
        Ok(list)
    } else {
        Err(MetronError::not_found("Reading list"))
    }
}

/// The list if the caller may change it.
async fn managed(state: &AppState, auth: &AuthContext, id: i64) -> MetronResult<ReadingList> {
    let list = visible(state, auth, id).await?;
    if list.manageable_by(auth.user_id, auth.is_staff()) {
        Ok(list)
    } else {
        Err(MetronError::Forbidden)
    }
}

async fn respond(state: &AppState, list: ReadingList) -> MetronResult<ReadingListResponse> {
    let span = reading_lists::span(&state.db.pool, list.id).await?;
    Ok(ReadingListResponse::new(list, span))
}

/// Reload after a write; the list was just checked, so a miss means it vanished meanwhile.
async fn reload(state: &AppState, id: i64) -> MetronResult<ReadingListResponse> {
    let list = found(reading_lists::find_by_id(&state.db.pool, id).await?, "Reading list")?;
    respond(state, list).await
}

/// GET /api/v1/reading_list
async fn list_reading_lists(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ReadingListFilter>,
) -> MetronResult<Json<Page<ReadingListListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) =
        reading_lists::list(&state.db.pool, auth.user_id, auth.is_staff(), &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/reading_list/{id}
async fn get_reading_list(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<ReadingListResponse>> {
    let list = visible(&state, &auth, id).await?;
    Ok(Json(respond(&state, list).await?))
}

/// POST /api/v1/reading_list
async fn create_reading_list(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateReadingListRequest>,
) -> MetronResult<(StatusCode, Json<ReadingListResponse>)> {
    validate_request(&body)?;
    validate_name(&body.name)?;

    let slug = resolve_slug(
        &state.db.pool,
        "reading_lists",
        body.slug.as_deref(),
        &name_slug(&body.name),
    )
    .await?;
    let id = reading_lists::create(&state.db.pool, &body, &slug, auth.user_id).await?;
    tracing::info!(reading_list_id = id, user_id = auth.user_id, "Reading list created");

    Ok((StatusCode::CREATED, Json(reload(&state, id).await?)))
}

/// PATCH /api/v1/reading_list/{id}
async fn update_reading_list(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateReadingListRequest>,
) -> MetronResult<Json<ReadingListResponse>> {
    validate_request(&body)?;
    if let Some(name) = &body.name {
        validate_name(name)?;
    }
    managed(&state, &auth, id).await?;

    reading_lists::update(&state.db.pool, id, &body, body.slug.as_deref()).await?;
    tracing::info!(reading_list_id = id, user_id = auth.user_id, "Reading list updated");
    Ok(Json(reload(&state, id).await?))
}

/// DELETE /api/v1/reading_list/{id}
async fn delete_reading_list(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<StatusCode> {
    managed(&state, &auth, id).await?;
    reading_lists::delete(&state.db.pool, id).await?;
    tracing::info!(reading_list_id = id, user_id = auth.user_id, "Reading list deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/reading_list/{id}/items
async fn list_items(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> MetronResult<Json<Page<ReadingListItemResponse>>> {
    visible(&state, &auth, id).await?;
    let request = page_request(query.page)?;
    let (rows, total) = reading_lists::items(&state.db.pool, id, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// POST /api/v1/reading_list/{id}/items
///
/// Appends after the last position; issues already on the list are skipped.
async fn add_items(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<AddItemsRequest>,
) -> MetronResult<Json<AddedItems>> {
    validate_request(&body)?;
    managed(&state, &auth, id).await?;

    let (last_order, on_list) = reading_lists::item_positions(&state.db.pool, id).await?;
    let planned = append_positions(last_order, &on_list, &body.issues);
    let added = if planned.is_empty() {
        0
    } else {
        let issue_type = body.issue_type.map(|t| t.as_str()).unwrap_or_default();
        reading_lists::add_items(&state.db.pool, id, &planned, issue_type).await?
    };
    tracing::info!(reading_list_id = id, added, user_id = auth.user_id, "Reading list items added");

    Ok(Json(AddedItems { added }))
}

/// DELETE /api/v1/reading_list/{id}/items/{issue_id}
async fn remove_item(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path((id, issue_id)): Path<(i64, i64)>,
) -> MetronResult<StatusCode> {
    managed(&state, &auth, id).await?;
    if !reading_lists::remove_item(&state.db.pool, id, issue_id).await? {
        return Err(MetronError::not_found("Reading list item"));
    }
    tracing::info!(reading_list_id = id, issue_id, user_id = auth.user_id, "Reading list item removed");
    Ok(StatusCode::NO_CONTENT)
}
