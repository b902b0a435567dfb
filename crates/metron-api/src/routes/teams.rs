//! Team routes.

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
        CreateTeamRequest, IssueListItem, NameFilter, NamedListItem, Team, TeamResponse,
        UpdateTeamRequest,
    },
    pagination::Page,
    slug::name_slug,
    validation::{validate_name, validate_request},
};
use metron_db::repository::{linked_refs, links, teams};
use std::sync::Arc;

use super::{PageQuery, found, issue_list, page_request, paginate, resolve_slug};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/team", get(list_teams).post(create_team))
        .route("/team/{id}", get(get_team).patch(update_team))
        .route("/team/{id}/issue_list", get(team_issues))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

async fn respond(state: &AppState, team: Team) -> MetronResult<TeamResponse> {
    let creators = linked_refs(&state.db.pool, links::TEAM_CREATORS, team.id).await?;
    let universes = linked_refs(&state.db.pool, links::TEAM_UNIVERSES, team.id).await?;
    Ok(TeamResponse {
        team,
        creators,
        universes,
    })
}

/// GET /api/v1/team
async fn list_teams(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<NameFilter>,
) -> MetronResult<Json<Page<NamedListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) = teams::list(&state.db.pool, &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/team/{id}
async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<TeamResponse>> {
    let team = found(teams::find_by_id(&state.db.pool, id).await?, "Team")?;
    Ok(Json(respond(&state, team).await?))
}

/// POST /api/v1/team
async fn create_team(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTeamRequest>,
) -> MetronResult<(StatusCode, Json<TeamResponse>)> {
    auth.require_editor()?;
    validate_request(&body)?;
    validate_name(&body.name)?;

    let slug = resolve_slug(&state.db.pool, "teams", body.slug.as_deref(), &name_slug(&body.name)).await?;
    let team = teams::create(&state.db.pool, &body, &slug, auth.user_id).await?;
    tracing::info!(team_id = team.id, user_id = auth.user_id, "Team created");

    Ok((StatusCode::CREATED, Json(respond(&state, team).await?)))
}

/// PATCH /api/v1/team/{id}
async fn update_team(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTeamRequest>,
) -> MetronResult<Json<TeamResponse>> {
    auth.require_editor()?;
    validate_request(&body)?;

    let team = found(teams::update(&state.db.pool, id, &body, auth.user_id).await?, "Team")?;
    tracing::info!(team_id = id, user_id = auth.user_id, "Team updated");
    Ok(Json(respond(&state, team).await?))
}

/// GET /api/v1/team/{id}/issue_list
async fn team_issues(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> MetronResult<Json<Page<IssueListItem>>> {
    let page = issue_list(&state.db.pool, "teams", "Team", links::ISSUE_TEAMS, id, query.page).await?;
    Ok(Json(page))
}
