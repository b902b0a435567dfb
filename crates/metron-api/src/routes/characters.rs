//! Character routes.

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
        Character, CharacterResponse, CreateCharacterRequest, IssueListItem, NameFilter,
        NamedListItem, UpdateCharacterRequest,
    },
    pagination::Page,
    slug::name_slug,
    validation::{validate_name, validate_request},
};
use metron_db::repository::{characters, links, linked_refs};
use std::sync::Arc;

use super::{PageQuery, found, issue_list, page_request, paginate, resolve_slug};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/character", get(list_characters).post(create_character))
        .route("/character/{id}", get(get_character).patch(update_character))
        .route("/character/{id}/issue_list", get(character_issues))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

async fn respond(state: &AppState, character: Character) -> MetronResult<CharacterResponse> {
    let pool = &state.db.pool;
    let creators = linked_refs(pool, links::CHARACTER_CREATORS, character.id).await?;
    let teams = linked_refs(pool, links::CHARACTER_TEAMS, character.id).await?;
    let universes = linked_refs(pool, links::CHARACTER_UNIVERSES, character.id).await?;
    Ok(CharacterResponse::new(character, creators, teams, universes))
}

/// GET /api/v1/character
async fn list_characters(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<NameFilter>,
) -> MetronResult<Json<Page<NamedListItem>>> {
    let request = page_request(filter.page)?;
    let (rows, total) = characters::list(&state.db.pool, &filter, &request).await?;
    Ok(Json(paginate(rows, total, &request)?))
}

/// GET /api/v1/character/{id}
async fn get_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> MetronResult<Json<CharacterResponse>> {
    let character = found(characters::find_by_id(&state.db.pool, id).await?, "Character")?;
    Ok(Json(respond(&state, character).await?))
}

/// POST /api/v1/character
async fn create_character(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCharacterRequest>,
) -> MetronResult<(StatusCode, Json<CharacterResponse>)> {
    auth.require_editor()?;
    validate_request(&body)?;
    validate_name(&body.name)?;

    let slug = resolve_slug(&state.db.pool, "characters", body.slug.as_deref(), &name_slug(&body.name)).await?;
    let character = characters::create(&state.db.pool, &body, &slug, auth.user_id).await?;
    tracing::info!(character_id = character.id, user_id = auth.user_id, "Character created");

    Ok((StatusCode::CREATED, Json(respond(&state, character).await?)))
}

/// PATCH /api/v1/character/{id}
async fn update_character(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCharacterRequest>,
) -> MetronResult<Json<CharacterResponse>> {
    auth.require_editor()?;
    validate_request(&body)?;

    let character = found(
        characters::update(&state.db.pool, id, &body, auth.user_id).await?,
        "Character",
    )?;
    tracing::info!(character_id = id, user_id = auth.user_id, "Character updated");
    Ok(Json(respond(&state, character).await?))
}

/// GET /api/v1/character/{id}/issue_list
async fn character_issues(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> MetronResult<Json<Page<IssueListItem>>> {
    let page = issue_list(
        &state.db.pool,
        "characters",
        "Character",
        links::ISSUE_CHARACTERS,
        id,
        query.page,
    )
    .await?;
    Ok(Json(page))
}
