//! Variant cover writes. Variants are read through their issue's detail.

use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    middleware,
    routing::{patch, post},
};
use metron_common::{
    error::{MetronError, MetronResult},
    models::{CreateVariantRequest, UpdateVariantRequest, VariantResponse},
    validation::validate_request,
};
use metron_db::repository::{issues, variants};
use std::sync::Arc;

use super::found;
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/variant", post(create_variant))
        .route("/variant/{id}", patch(update_variant))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// A variant must point at an existing issue; a dangling id is a bad request.
async fn ensure_issue(state: &AppState, id: i64) -> MetronResult<()> {
    match issues::find_by_id(&state.db.pool, id).await? {
        Some(_) => Ok(()),
        None => Err(MetronError::validation(format!("Issue {id} does not exist."))),
    }
}

/// POST /api/v1/variant
async fn create_variant(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateVariantRequest>,
) -> MetronResult<(StatusCode, Json<VariantResponse>)> {
    auth.require_editor()?;
    validate_request(&body)?;
    ensure_issue(&state, body.issue).await?;

    let row = variants::create(&state.db.pool, &body, auth.user_id).await?;
    tracing::info!(variant_id = row.id, issue_id = row.issue_id, user_id = auth.user_id, "Variant created");

    Ok((StatusCode::CREATED, Json(VariantResponse::from(row))))
}

/// PATCH /api/v1/variant/{id}
async fn update_variant(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateVariantRequest>,
) -> MetronResult<Json<VariantResponse>> {
    auth.require_editor()?;
    validate_request(&body)?;
    if let Some(issue_id) = body.issue {
        ensure_issue(&state, issue_id).await?;
    }

    let row = found(
        variants::update(&state.db.pool, id, &body, auth.user_id).await?,
        "Variant",
    )?;
    tracing::info!(variant_id = id, user_id = auth.user_id, "Variant updated");
    Ok(Json(VariantResponse::from(row)))
}
