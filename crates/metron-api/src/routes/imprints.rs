//! Imprint routes.

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
        CreateImprintRequest, Imprint, ImprintResponse, NameFilter, NamedListItem,
        UpdateImprintRequest,
    },
    pagination::Page,
    slug::name_slug,
    validation::{validate_name, validate_request},
};
use metron_db::repository::{self, imprints};
use std::sync::Arc;

use super::{found, page_request, paginate, resolve_slug};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/imprint", get(list_imprints).post(create_imprint))
        .route("/imprint/{id}", get(get_imprint).patch(update_imprint))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

async fn respond(state: &AppState, imprint: Imprint) -> MetronResult<ImprintResponse> {
    let publisher = found(
        repository::named_ref(&state.db.pool, "publishers", imprint.publisher_id).await?,
        "Publisher",
    )?;
    Ok(ImprintResponse::new(imprint, publisher))
}

/// GET /api/v1/imprint
async fn list_imprints(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<NameFilter>,
) -> MetronResult<Json<Page<NamedListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) = imprints::list(&state.db.pool, &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/imprint/{id}
async fn get_imprint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<ImprintResponse>> {
    let imprint = found(imprints::find_by_id(&state.db.pool, id).await?, "Imprint")?;
    Ok(Json(respond(&state, imprint).await?))
}

/// POST /api/v1/imprint
async fn create_imprint(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateImprintRequest>,
) -> MetronResult<(StatusCode, Json<ImprintResponse>)> {
    auth.require_editor()?;
    validate_request(&body)?;
    validate_name(&body.name)?;

    let slug = resolve_slug(&state.db.pool, "imprints", body.slug.as_deref(), &name_slug(&body.name)).await?;
    let imprint = imprints::create(&state.db.pool, &body, &slug, auth.user_id).await?;
    tracing::info!(imprint_id = imprint.id, user_id = auth.user_id, "Imprint created");

    Ok((StatusCode::CREATED, Json(respond(&state, imprint).await?)))
}

/// PATCH /api/v1/imprint/{id}
async fn update_imprint(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateImprintRequest>,
) -> MetronResult<Json<ImprintResponse>> {
    auth.require_editor()?;
    validate_request(&body)?;

    let imprint = found(
        imprints::update(&state.db.pool, id, &body, auth.user_id).await?,
        "Imprint",
    )?;
    tracing::info!(imprint_id = id, user_id = auth.user_id, "Imprint updated");
    Ok(Json(respond(&state, imprint).await?))
}
