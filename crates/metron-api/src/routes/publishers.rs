//! Publisher routes.

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
        CreatePublisherRequest, NameFilter, NamedListItem, PublisherResponse, SeriesListItem,
        UpdatePublisherRequest,
    },
    pagination::Page,
    slug::name_slug,
    validation::{validate_name, validate_request},
};
use metron_db::repository::publishers;
use std::sync::Arc;

use super::{PageQuery, found, page_request, paginate, resolve_slug};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/publisher", get(list_publishers).post(create_publisher))
        .route("/publisher/{id}", get(get_publisher).patch(update_publisher))
        .route("/publisher/{id}/series_list", get(series_list))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// GET /api/v1/publisher
async fn list_publishers(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<NameFilter>,
) -> MetronResult<Json<Page<NamedListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) = publishers::list(&state.db.pool, &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

async fn load(state: &AppState, id: i64) -> MetronResult<PublisherResponse> {
    let publisher = found(publishers::find_by_id(&state.db.pool, id).await?, "Publisher")?;
    let series_count = publishers::series_count(&state.db.pool, id).await?;
    Ok(PublisherResponse {
        publisher,
        series_count,
    })
}

/// GET /api/v1/publisher/{id}
async fn get_publisher(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<PublisherResponse>> {
    Ok(Json(load(&state, id).await?))
}

/// POST /api/v1/publisher
async fn create_publisher(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePublisherRequest>,
) -> MetronResult<(StatusCode, Json<PublisherResponse>)> {
    auth.require_editor()?;
    validate_request(&body)?;
    validate_name(&body.name)?;

    let slug = resolve_slug(
        &state.db.pool,
        "publishers",
        body.slug.as_deref(),
        &name_slug(&body.name),
    )
    .await?;
    let publisher = publishers::create(&state.db.pool, &body, &slug, auth.user_id).await?;

    tracing::info!(publisher_id = publisher.id, user_id = auth.user_id, "Publisher created");

    Ok((
        StatusCode::CREATED,
        Json(PublisherResponse {
            publisher,
            series_count: 0,
        }),
    ))
}

/// PATCH /api/v1/publisher/{id}
async fn update_publisher(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePublisherRequest>,
) -> MetronResult<Json<PublisherResponse>> {
    auth.require_editor()?;
    validate_request(&body)?;

    found(
        publishers::update(&state.db.pool, id, &body, auth.user_id).await?,
        "Publisher",
    )?;
    tracing::info!(publisher_id = id, user_id = auth.user_id, "Publisher updated");

    Ok(Json(load(&state, id).await?))
}

/// GET /api/v1/publisher/{id}/series_list
async fn series_list(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> MetronResult<Json<Page<SeriesListItem>>> {
    found(publishers::find_by_id(&state.db.pool, id).await?, "Publisher")?;
    let request = page_request(query.page)?;
    let (rows, total) = publishers::series_list(&state.db.pool, id, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}
