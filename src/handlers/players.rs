use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::User,
    repositories::{game as game_repo, player as player_repo},
    state::AppState,
    validation::games::validate_player_id,
};

use super::games::{find_owned, Pagination};

/// The largest page size a player listing will serve.
const MAX_PAGE_SIZE: i64 = 100;

/// The query parameters for listing players.
#[derive(Deserialize)]
pub struct ListPlayersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// The request payload for creating or updating a player record.
#[derive(Deserialize)]
pub struct UpsertPlayerRequest {
    pub player_id: String,
    pub external_id: Option<String>,
    pub game_data: Option<Value>,
    pub play_time: Option<i64>,
}

/// Lists a game's players, paginated and sorted.
#[axum::debug_handler]
pub async fn list_players(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(game_id): Path<Uuid>,
    Query(query): Query<ListPlayersQuery>,
) -> Result<Json<Value>> {
    find_owned(&state, &user, &game_id).await?;

    let (page, limit) = Pagination::clamp(query.page, query.limit, 20, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;
    let sort_by = query.sort_by.as_deref().unwrap_or("last_played_at");
    let ascending = query.order.as_deref() == Some("asc");

    let players =
        player_repo::list_by_game(&state.db, &game_id, sort_by, ascending, limit, offset)
            .await?;
    let total = player_repo::count_by_game(&state.db, &game_id).await?;

    Ok(Json(serde_json::json!({
        "players": players,
        "pagination": Pagination::new(page, limit, total),
    })))
}

/// Creates a player record or merges into the existing one.
///
/// Incoming `game_data` is shallow-merged over what is stored and
/// `play_time` accumulates; a first-time player bumps the game's player
/// count.
#[axum::debug_handler]
pub async fn upsert_player(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<UpsertPlayerRequest>,
) -> Result<Response> {
    find_owned(&state, &user, &game_id).await?;
    validate_player_id(&req.player_id)?;

    let game_data = req.game_data.unwrap_or_else(|| Value::Object(Default::default()));
    if !game_data.is_object() {
        return Err(AppError::Validation(
            "game_data must be a JSON object".to_string(),
        ));
    }

    let play_time = req.play_time.unwrap_or(0);
    if play_time < 0 {
        return Err(AppError::Validation(
            "play_time cannot be negative".to_string(),
        ));
    }

    let (player, inserted) = player_repo::upsert(
        &state.db,
        &game_id,
        &req.player_id,
        req.external_id,
        game_data,
        play_time,
    )
    .await?;

    if inserted {
        game_repo::record_new_player(&state.db, &game_id).await?;
    } else {
        game_repo::record_play(&state.db, &game_id).await?;
    }

    let (status, message) = if inserted {
        (StatusCode::CREATED, "Player created successfully")
    } else {
        (StatusCode::OK, "Player updated successfully")
    };

    Ok((
        status,
        Json(serde_json::json!({
            "message": message,
            "player": player,
        })),
    )
        .into_response())
}

/// Fetches a single player record.
#[axum::debug_handler]
pub async fn get_player(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((game_id, player_id)): Path<(Uuid, String)>,
) -> Result<Json<Value>> {
    find_owned(&state, &user, &game_id).await?;

    let player = player_repo::find_one(&state.db, &game_id, &player_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(serde_json::json!({ "player": player })))
}

/// Deletes a player record.
#[axum::debug_handler]
pub async fn delete_player(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((game_id, player_id)): Path<(Uuid, String)>,
) -> Result<Json<Value>> {
    find_owned(&state, &user, &game_id).await?;

    let deleted = player_repo::delete(&state.db, &game_id, &player_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(serde_json::json!({
        "message": "Player deleted successfully",
    })))
}
