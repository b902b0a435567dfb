//! Universe routes.

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
        CreateUniverseRequest, IssueListItem, NamedListItem, Universe, UniverseFilter,
        UniverseResponse, UpdateUniverseRequest,
    },
    pagination::Page,
    slug::name_slug,
    validation::{validate_name, validate_request},
};
use metron_db::repository::{self, links, universes};
use std::sync::Arc;

use super::{PageQuery, found, issue_list, page_request, paginate, resolve_slug};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/universe", get(list_universes).post(create_universe))
        .route("/universe/{id}", get(get_universe).patch(update_universe))
        .route("/universe/{id}/issue_list", get(universe_issues))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

async fn respond(state: &AppState, universe: Universe) -> MetronResult<UniverseResponse> {
    let publisher = found(
        repository::named_ref(&state.db.pool, "publishers", universe.publisher_id).await?,
        "Publisher",
    )?;
    Ok(UniverseResponse::new(universe, publisher))
}

/// GET /api/v1/universe
async fn list_universes(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<UniverseFilter>,
) -> MetronResult<Json<Page<NamedListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) = universes::list(&state.db.pool, &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/universe/{id}
async fn get_universe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<UniverseResponse>> {
    let universe = found(universes::find_by_id(&state.db.pool, id).await?, "Universe")?;
    Ok(Json(respond(&state, universe).await?))
}

/// POST /api/v1/universe
async fn create_universe(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUniverseRequest>,
) -> MetronResult<(StatusCode, Json<UniverseResponse>)> {
    auth.require_editor()?;
    validate_request(&body)?;
    validate_name(&body.name)?;

    let slug = resolve_slug(&state.db.pool, "universes", body.slug.as_deref(), &name_slug(&body.name)).await?;
    let universe = universes::create(&state.db.pool, &body, &slug, auth.user_id).await?;
    tracing::info!(universe_id = universe.id, user_id = auth.user_id, "Universe created");

    Ok((StatusCode::CREATED, Json(respond(&state, universe).await?)))
}

/// PATCH /api/v1/universe/{id}
async fn update_universe(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUniverseRequest>,
) -> MetronResult<Json<UniverseResponse>> {
    auth.require_editor()?;
    validate_request(&body)?;

    let universe = found(
        universes::update(&state.db.pool, id, &body, auth.user_id).await?,
        "Universe",
    )?;
    tracing::info!(universe_id = id, user_id = auth.user_id, "Universe updated");
    Ok(Json(respond(&state, universe).await?))
}

/// GET /api/v1/universe/{id}/issue_list
async fn universe_issues(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> MetronResult<Json<Page<IssueListItem>>> {
    let page = issue_list(
        &state.db.pool,
        "universes",
        "Universe",
        links::ISSUE_UNIVERSES,
        id,
        query.page,
    )
    .await?;
    Ok(Json(page))
}
