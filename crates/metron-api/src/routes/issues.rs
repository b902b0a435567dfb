//! Issue routes and the two guarded issue actions: reprint sync and credit duplication.
//!
//! Guarded actions always answer 200 with flash messages; a refusal is reported in the
//! body with `applied: false`.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use metron_common::{
    credits::{self as duplication, SourceCredit},
    error::{MetronError, MetronResult},
    models::{
        ActionResponse, CreateIssueRequest, Issue, IssueFilter, IssueListItem, IssueRef,
        IssueResponse, IssueSeriesDetail, Series, UpdateIssueRequest, check_issue_series_rules,
    },
    pagination::Page,
    reprints::plan_reprint_sync,
    slug::issue_slug,
    validation::validate_request,
};
use metron_db::repository::{self, credits, issues, series};
use std::sync::Arc;

use super::{found, page_request, paginate, resolve_slug, rule_failed};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/issue", get(list_issues).post(create_issue))
        .route("/issue/{id}", get(get_issue).patch(update_issue))
        .route("/issue/{id}/sync-reprints", post(sync_reprints))
        .route("/issue/{id}/duplicate-credits", post(duplicate_credits))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// The series an issue is being written against. A dangling id is a bad request, not a 404.
async fn target_series(state: &AppState, id: i64) -> MetronResult<Series> {
    series::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| MetronError::validation(format!("Series {id} does not exist.")))
}

async fn respond(state: &AppState, issue: Issue) -> MetronResult<IssueResponse> {
    let pool = &state.db.pool;
    let parent = found(series::find_by_id(pool, issue.series_id).await?, "Series")?;
    let series_type = found(
        repository::named_ref(pool, "series_types", parent.series_type_id).await?,
        "Series type",
    )?;
    let publisher = found(
        repository::named_ref(pool, "publishers", parent.publisher_id).await?,
        "Publisher",
    )?;
    let imprint = match parent.imprint_id {
        Some(imprint_id) => repository::named_ref(pool, "imprints", imprint_id).await?,
        None => None,
    };
    let rating = found(repository::named_ref(pool, "ratings", issue.rating_id).await?, "Rating")?;
    let relations = issues::relations(pool, issue.id).await?;

    let detail = IssueSeriesDetail {
        id: parent.id,
        name: parent.name,
        sort_name: parent.sort_name,
        volume: parent.volume,
        year_began: parent.year_began,
        series_type,
    };
    Ok(IssueResponse::new(issue, detail, publisher, imprint, rating, relations))
}

/// GET /api/v1/issue
async fn list_issues(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<IssueFilter>,
) -> MetronResult<Json<Page<IssueListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) = issues::list(&state.db.pool, &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/issue/{id}
async fn get_issue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<IssueResponse>> {
    let issue = found(issues::find_by_id(&state.db.pool, id).await?, "Issue")?;
    Ok(Json(respond(&state, issue).await?))
}

/// POST /api/v1/issue
async fn create_issue(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateIssueRequest>,
) -> MetronResult<(StatusCode, Json<IssueResponse>)> {
    auth.require_editor()?;
    validate_request(&body)?;

    let parent = target_series(&state, body.series).await?;
    check_issue_series_rules(
        body.title.as_deref().unwrap_or_default(),
        !body.arcs.is_empty(),
        parent.collection,
        parent.series_type_id,
    )
    .map_err(rule_failed)?;

    let slug = resolve_slug(
        &state.db.pool,
        "issues",
        body.slug.as_deref(),
        &issue_slug(&parent.slug, &body.number),
    )
    .await?;
    let issue = issues::create(&state.db.pool, &body, &slug, auth.user_id).await?;
    tracing::info!(issue_id = issue.id, series_id = parent.id, user_id = auth.user_id, "Issue created");

    Ok((StatusCode::CREATED, Json(respond(&state, issue).await?)))
}

/// PATCH /api/v1/issue/{id}
async fn update_issue(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateIssueRequest>,
) -> MetronResult<Json<IssueResponse>> {
    auth.require_editor()?;
    validate_request(&body)?;

    let current = found(issues::find_by_id(&state.db.pool, id).await?, "Issue")?;
    let parent = target_series(&state, body.series.unwrap_or(current.series_id)).await?;
    let has_arcs = match &body.arcs {
        Some(arcs) => !arcs.is_empty(),
        None => issues::arc_count(&state.db.pool, id).await? > 0,
    };
    check_issue_series_rules(
        body.title.as_deref().unwrap_or(&current.title),
        has_arcs,
        parent.collection,
        parent.series_type_id,
    )
    .map_err(rule_failed)?;

    let issue = found(
        issues::update(&state.db.pool, id, &body, auth.user_id).await?,
        "Issue",
    )?;
    tracing::info!(issue_id = id, user_id = auth.user_id, "Issue updated");
    Ok(Json(respond(&state, issue).await?))
}

/// POST /api/v1/issue/{id}/sync-reprints
///
/// Copy characters, teams and story titles from the issues a collection reprints.
async fn sync_reprints(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<ActionResponse>> {
    auth.require_editor()?;

    let collection = found(issues::collection_state(&state.db.pool, id).await?, "Issue")?;
    let sources = issues::reprint_sources(&state.db.pool, id).await?;

    let plan = match plan_reprint_sync(&collection, &sources) {
        Ok(plan) => plan,
        Err(refusal) => {
            tracing::info!(issue_id = id, ?refusal, "Reprint sync refused");
            return Ok(Json(ActionResponse {
                applied: false,
                messages: refusal.messages(),
            }));
        }
    };

    issues::apply_reprint_sync(&state.db.pool, id, &plan, auth.user_id).await?;
    tracing::info!(
        issue_id = id,
        user_id = auth.user_id,
        characters = plan.character_ids.len(),
        teams = plan.team_ids.len(),
        stories = plan.stories.len(),
        "Reprint sync applied"
    );

    Ok(Json(ActionResponse {
        applied: true,
        messages: plan.messages(),
    }))
}

/// POST /api/v1/issue/{id}/duplicate-credits
///
/// Copy the credits of the previous issue in the series, leaving out cover-only credits.
async fn duplicate_credits(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<ActionResponse>> {
    auth.require_editor()?;

    let pool = &state.db.pool;
    let issue = found(issues::context(pool, id).await?, "Issue")?;

    let refused = |refusal: duplication::DuplicateRefusal| {
        tracing::info!(issue_id = id, ?refusal, "Credit duplication refused");
        Json(ActionResponse {
            applied: false,
            messages: vec![refusal.message()],
        })
    };

    let existing = credits::count_for_issue(pool, id).await?;
    if let Err(refusal) = duplication::check_target(&issue.publisher_name, existing as usize) {
        return Ok(refused(refusal));
    }

    let Some(previous) = issues::previous_in_series(pool, issue.series_id, issue.cover_date).await?
    else {
        return Ok(refused(duplication::DuplicateRefusal::NoPreviousIssue));
    };
    let previous_id = previous.id;
    let previous_label = IssueRef::from(previous).issue;

    let sources: Vec<SourceCredit> = credits::for_issue(pool, previous_id)
        .await?
        .into_iter()
        .map(|c| SourceCredit {
            creator_id: c.creator.id,
            creator_name: c.creator.name,
            roles: c.role,
        })
        .collect();

    let planned = match duplication::plan_duplicate(&previous_label, &sources) {
        Ok(planned) => planned,
        Err(refusal) => return Ok(refused(refusal)),
    };

    credits::apply_duplicate(pool, id, &planned, auth.user_id).await?;
    tracing::info!(
        issue_id = id,
        previous_id,
        credits = planned.len(),
        user_id = auth.user_id,
        "Credits duplicated"
    );

    Ok(Json(ActionResponse {
        applied: true,
        messages: vec![duplication::success_message(planned.len(), &previous_label)],
    }))
}
