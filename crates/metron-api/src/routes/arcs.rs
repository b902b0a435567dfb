//! Story arc routes.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
};
use metron_common::{
    error::MetronResult,
    models::{CreateArcRequest, IssueListItem, NameFilter, NamedListItem, StoryArc, UpdateArcRequest},
    pagination::Page,
    slug::name_slug,
    validation::{validate_name, validate_request},
};
use metron_db::repository::{arcs, links};
use std::sync::Arc;

use super::{PageQuery, found, issue_list, page_request, paginate, resolve_slug};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/arc", get(list_arcs).post(create_arc))
        .route("/arc/{id}", get(get_arc).patch(update_arc))
        .route("/arc/{id}/issue_list", get(arc_issues))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// GET /api/v1/arc
async fn list_arcs(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<NameFilter>,
) -> MetronResult<Json<Page<NamedListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) = arcs::list(&state.db.pool, &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/arc/{id}
async fn get_arc(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<StoryArc>> {
    Ok(Json(found(arcs::find_by_id(&state.db.pool, id).await?, "Arc")?))
}

/// POST /api/v1/arc
async fn create_arc(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateArcRequest>,
) -> MetronResult<(StatusCode, Json<StoryArc>)> {
    auth.require_editor()?;
    validate_request(&body)?;
    validate_name(&body.name)?;

    let slug = resolve_slug(&state.db.pool, "arcs", body.slug.as_deref(), &name_slug(&body.name)).await?;
    let arc = arcs::create(&state.db.pool, &body, &slug, auth.user_id).await?;
    tracing::info!(arc_id = arc.id, user_id = auth.user_id, "Arc created");

    Ok((StatusCode::CREATED, Json(arc)))
}

/// PATCH /api/v1/arc/{id}
async fn update_arc(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateArcRequest>,
) -> MetronResult<Json<StoryArc>> {
    auth.require_editor()?;
    validate_request(&body)?;

    let arc = found(arcs::update(&state.db.pool, id, &body, auth.user_id).await?, "Arc")?;
    tracing::info!(arc_id = id, user_id = auth.user_id, "Arc updated");
    Ok(Json(arc))
}

/// GET /api/v1/arc/{id}/issue_list
async fn arc_issues(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> MetronResult<Json<Page<IssueListItem>>> {
    let page = issue_list(&state.db.pool, "arcs", "Arc", links::ISSUE_ARCS, id, query.page).await?;
    Ok(Json(page))
}
