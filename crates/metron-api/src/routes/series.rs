//! Series routes, including the bulk issue-slug rename.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use metron_common::{
    error::MetronResult,
    models::{
        CreateSeriesRequest, IssueListItem, Series, SeriesFilter, SeriesListItem,
        SeriesResponse, UpdateSeriesRequest, check_associated, check_series_rules, default_sort_name,
    },
    pagination::Page,
    slug::{batch_issue_slugs, series_slug},
    validation::{validate_name, validate_request},
};
use metron_db::repository::{self, issues, series};
use serde::Serialize;
use std::sync::Arc;

use super::{PageQuery, found, page_request, paginate, resolve_slug, rule_failed};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/series", get(list_series).post(create_series))
        .route("/series/{id}", get(get_series).patch(update_series))
        .route("/series/{id}/issue_list", get(series_issues))
        .route("/series/{id}/rename-issue-slugs", post(rename_issue_slugs))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Debug, Serialize)]
struct RenamedSlugs {
    updated: u64,
}

async fn respond(state: &AppState, series: Series) -> MetronResult<SeriesResponse> {
    let pool = &state.db.pool;
    let series_type = found(
        repository::named_ref(pool, "series_types", series.series_type_id).await?,
        "Series type",
    )?;
    let publisher = found(
        repository::named_ref(pool, "publishers", series.publisher_id).await?,
        "Publisher",
    )?;
    let imprint = match series.imprint_id {
        Some(imprint_id) => repository::named_ref(pool, "imprints", imprint_id).await?,
        None => None,
    };
    let issue_count = series::issue_count(pool, series.id).await?;
    let relations = series::relations(pool, series.id).await?;
    Ok(SeriesResponse::new(
        series,
        series_type,
        publisher,
        imprint,
        issue_count,
        relations,
    ))
}

/// GET /api/v1/series
async fn list_series(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SeriesFilter>,
) -> MetronResult<Json<Page<SeriesListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) = series::list(&state.db.pool, &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/series/{id}
async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<SeriesResponse>> {
    let row = found(series::find_by_id(&state.db.pool, id).await?, "Series")?;
    Ok(Json(respond(&state, row).await?))
}

/// POST /api/v1/series
async fn create_series(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSeriesRequest>,
) -> MetronResult<(StatusCode, Json<SeriesResponse>)> {
    auth.require_editor()?;
    validate_request(&body)?;
    validate_name(&body.name)?;

    let slug = resolve_slug(
        &state.db.pool,
        "series",
        body.slug.as_deref(),
        &series_slug(&body.name, body.year_began),
    )
    .await?;
    let sort_name = body
        .sort_name
        .clone()
        .unwrap_or_else(|| default_sort_name(&body.name));

    let row = series::create(&state.db.pool, &body, &slug, &sort_name, auth.user_id).await?;
    tracing::info!(series_id = row.id, user_id = auth.user_id, "Series created");

    Ok((StatusCode::CREATED, Json(respond(&state, row).await?)))
}

/// PATCH /api/v1/series/{id}
async fn update_series(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateSeriesRequest>,
) -> MetronResult<Json<SeriesResponse>> {
    auth.require_editor()?;
    validate_request(&body)?;

    let current = found(series::find_by_id(&state.db.pool, id).await?, "Series")?;
    check_series_rules(
        body.series_type.unwrap_or(current.series_type_id),
        body.year_began.unwrap_or(current.year_began),
        body.year_end.or(current.year_end),
        body.cv_id.or(current.cv_id),
    )
    .map_err(rule_failed)?;
    if let Some(associated) = &body.associated {
        check_associated(id, associated).map_err(rule_failed)?;
    }

    let row = found(
        series::update(&state.db.pool, id, &body, auth.user_id).await?,
        "Series",
    )?;
    tracing::info!(series_id = id, user_id = auth.user_id, "Series updated");
    Ok(Json(respond(&state, row).await?))
}

/// GET /api/v1/series/{id}/issue_list
async fn series_issues(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> MetronResult<Json<Page<IssueListItem>>> {
    found(series::find_by_id(&state.db.pool, id).await?, "Series")?;
    let request = page_request(query.page)?;
    let (rows, total) = issues::list_for_series(&state.db.pool, id, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// POST /api/v1/series/{id}/rename-issue-slugs
///
/// Resets every issue slug to `<series slug>-<number>`, suffixing numbers that slugify
/// alike. Staff only.
async fn rename_issue_slugs(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<RenamedSlugs>> {
    auth.require_staff()?;

    let row = found(series::find_by_id(&state.db.pool, id).await?, "Series")?;
    let numbers = series::issue_numbers(&state.db.pool, id).await?;
    let taken = series::foreign_issue_slugs(&state.db.pool, id, &row.slug).await?;
    let updates = batch_issue_slugs(&row.slug, &numbers, &taken);

    let updated = series::rename_issue_slugs(&state.db.pool, &updates).await?;
    tracing::info!(series_id = id, updated, user_id = auth.user_id, "Issue slugs renamed");

    Ok(Json(RenamedSlugs { updated }))
}
