use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{game::Game, user::User},
    repositories::game as game_repo,
    state::AppState,
    validation::games::*,
};

/// The largest page size a game listing will serve.
const MAX_PAGE_SIZE: i64 = 50;

/// The request payload for creating a game.
#[derive(Deserialize)]
pub struct CreateGameRequest {
    pub name: String,
    pub description: Option<String>,
}

/// The request payload for updating a game. All fields optional; an
/// empty update set is rejected.
#[derive(Deserialize)]
pub struct UpdateGameRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// The query parameters for paginated listings.
#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// The pagination envelope returned alongside every list.
#[derive(Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    /// Normalizes raw query values: page is at least 1, limit is clamped
    /// into `1..=max`.
    pub fn clamp(page: Option<i64>, limit: Option<i64>, default_limit: i64, max: i64) -> (i64, i64) {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, max);
        (page, limit)
    }

    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: (total + limit - 1) / limit.max(1),
        }
    }
}

/// Lists the caller's games, newest activity first.
#[axum::debug_handler]
pub async fn list_games(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> Result<Json<serde_json::Value>> {
    let (page, limit) = Pagination::clamp(query.page, query.limit, 10, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let games =
        game_repo::list_by_owner(&state.db, &user.external_id, limit, offset).await?;
    let total = game_repo::count_by_owner(&state.db, &user.external_id).await?;

    Ok(Json(serde_json::json!({
        "games": games,
        "pagination": Pagination::new(page, limit, total),
    })))
}

/// Creates a new game owned by the caller.
#[axum::debug_handler]
pub async fn create_game(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Response> {
    validate_game_name(&req.name)?;
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }

    let game = game_repo::create(&state.db, &user.external_id, req.name, req.description)
        .await?;

    tracing::info!("✅ Game created: {} by {}", game.id, user.external_id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Game created successfully",
            "game": game,
        })),
    )
        .into_response())
}

/// Fetches one of the caller's games.
///
/// A game that does not exist and a game owned by someone else are both
/// 404; existence is never disclosed to non-owners.
#[axum::debug_handler]
pub async fn get_game(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let game = find_owned(&state, &user, &game_id).await?;
    Ok(Json(serde_json::json!({ "game": game })))
}

/// Applies a partial update to one of the caller's games.
#[axum::debug_handler]
pub async fn update_game(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<UpdateGameRequest>,
) -> Result<Json<serde_json::Value>> {
    if req.name.is_none() && req.description.is_none() {
        return Err(AppError::Validation(
            "No valid fields to update".to_string(),
        ));
    }

    if let Some(ref name) = req.name {
        validate_game_name(name)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }

    let game = game_repo::update_owned(
        &state.db,
        &game_id,
        &user.external_id,
        req.name,
        req.description,
    )
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(Json(serde_json::json!({
        "message": "Game updated successfully",
        "game": game,
    })))
}

/// Deletes one of the caller's games along with its players and saves.
#[axum::debug_handler]
pub async fn delete_game(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let deleted = game_repo::delete_owned(&state.db, &game_id, &user.external_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    tracing::info!("🗑️ Game deleted: {} by {}", game_id, user.external_id);

    Ok(Json(serde_json::json!({
        "message": "Game and associated data deleted successfully",
    })))
}

/// Loads an owned game or rejects with the uniform 404.
pub async fn find_owned(state: &AppState, user: &User, game_id: &Uuid) -> Result<Game> {
    game_repo::find_owned(&state.db, game_id, &user.external_id)
        .await?
        .ok_or(AppError::NotFound)
}
