//! Creator routes.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
};
use metron_common::{
    error::MetronResult,
    models::{
        CreateCreatorRequest, Creator, IssueListItem, NameFilter, NamedListItem,
        UpdateCreatorRequest, check_lifespan,
    },
    pagination::Page,
    slug::name_slug,
    validation::{validate_name, validate_request},
};
use metron_db::repository::{creators, links};
use std::sync::Arc;

use super::{PageQuery, found, issue_list, page_request, paginate, resolve_slug, rule_failed};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/creator", get(list_creators).post(create_creator))
        .route("/creator/{id}", get(get_creator).patch(update_creator))
        .route("/creator/{id}/issue_list", get(creator_issues))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// GET /api/v1/creator
async fn list_creators(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<NameFilter>,
) -> MetronResult<Json<Page<NamedListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) = creators::list(&state.db.pool, &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/creator/{id}
async fn get_creator(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<Creator>> {
    Ok(Json(found(creators::find_by_id(&state.db.pool, id).await?, "Creator")?))
}

/// POST /api/v1/creator
async fn create_creator(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCreatorRequest>,
) -> MetronResult<(StatusCode, Json<Creator>)> {
    auth.require_editor()?;
    validate_request(&body)?;
    validate_name(&body.name)?;

    let slug = resolve_slug(&state.db.pool, "creators", body.slug.as_deref(), &name_slug(&body.name)).await?;
    let creator = creators::create(&state.db.pool, &body, &slug, auth.user_id).await?;
    tracing::info!(creator_id = creator.id, user_id = auth.user_id, "Creator created");

    Ok((StatusCode::CREATED, Json(creator)))
}

/// PATCH /api/v1/creator/{id}
async fn update_creator(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCreatorRequest>,
) -> MetronResult<Json<Creator>> {
    auth.require_editor()?;
    validate_request(&body)?;

    // Birth and death are checked against whatever the row will hold afterwards.
    let current = found(creators::find_by_id(&state.db.pool, id).await?, "Creator")?;
    check_lifespan(body.birth.or(current.birth), body.death.or(current.death)).map_err(rule_failed)?;

    let creator = found(
        creators::update(&state.db.pool, id, &body, auth.user_id).await?,
        "Creator",
    )?;
    tracing::info!(creator_id = id, user_id = auth.user_id, "Creator updated");
    Ok(Json(creator))
}

/// GET /api/v1/creator/{id}/issue_list
async fn creator_issues(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> MetronResult<Json<Page<IssueListItem>>> {
    let page = issue_list(
        &state.db.pool,
        "creators",
        "Creator",
        links::ISSUE_CREATORS,
        id,
        query.page,
    )
    .await?;
    Ok(Json(page))
}
