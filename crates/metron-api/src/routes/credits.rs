//! Credit creation. Accepts a single credit or an array of them.

use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    middleware,
    routing::post,
};
use metron_common::{
    error::{MetronError, MetronResult},
    models::{CreateCreditRequest, CreditResponse},
    validation::validate_request,
};
use metron_db::repository::{credits, roles};
use serde::Deserialize;
use std::sync::Arc;

use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/credit", post(create_credits))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreditBody {
    Many(Vec<CreateCreditRequest>),
    One(CreateCreditRequest),
}

impl CreditBody {
    fn into_vec(self) -> Vec<CreateCreditRequest> {
        match self {
            Self::Many(credits) => credits,
            Self::One(credit) => vec![credit],
        }
    }
}

/// POST /api/v1/credit
async fn create_credits(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreditBody>,
) -> MetronResult<(StatusCode, Json<Vec<CreditResponse>>)> {
    auth.require_editor()?;

    let requests = body.into_vec();
    if requests.is_empty() {
        return Err(MetronError::validation("At least one credit is required"));
    }

    let mut rows = Vec::with_capacity(requests.len());
    for request in &requests {
        validate_request(request)?;
        let mut role_ids = request.role.clone();
        role_ids.sort_unstable();
        role_ids.dedup();
        if roles::count_existing(&state.db.pool, &role_ids).await? != role_ids.len() as i64 {
            return Err(MetronError::validation("Unknown role in credit"));
        }
        rows.push((request.issue, request.creator, role_ids));
    }

    let created = credits::create_many(&state.db.pool, &rows).await?;
    tracing::info!(count = created.len(), user_id = auth.user_id, "Credits created");

    let response = created
        .into_iter()
        .zip(rows)
        .map(|(credit, (_, _, role))| CreditResponse {
            id: credit.id,
            issue: credit.issue_id,
            creator: credit.creator_id,
            role,
        })
        .collect();
    Ok((StatusCode::CREATED, Json(response)))
}
