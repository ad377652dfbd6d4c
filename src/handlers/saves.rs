use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::User,
    repositories::save as save_repo,
    services::saves as save_service,
    state::AppState,
};

use super::games::find_owned;

/// How many recent saves the schema summary samples.
const SCHEMA_SAMPLE_SIZE: i64 = 100;

/// The query parameters for listing save data.
#[derive(Deserialize)]
pub struct ListSavesQuery {
    pub player_external_id: String,
}

/// The request payload for writing save data.
#[derive(Deserialize)]
pub struct UpsertSaveRequest {
    pub player_external_id: String,
    pub save_name: Option<String>,
    pub save_data: Value,
    pub version: Option<String>,
}

/// Lists a player's saves for one of the caller's games, most recently
/// played first.
#[axum::debug_handler]
pub async fn list_saves(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(game_id): Path<Uuid>,
    Query(query): Query<ListSavesQuery>,
) -> Result<Json<Value>> {
    find_owned(&state, &user, &game_id).await?;

    let saves =
        save_repo::list_for_player(&state.db, &game_id, &query.player_external_id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": saves,
    })))
}

/// Creates a named save slot or merges new data into it.
#[axum::debug_handler]
pub async fn upsert_save(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<UpsertSaveRequest>,
) -> Result<Json<Value>> {
    find_owned(&state, &user, &game_id).await?;

    if req.player_external_id.trim().is_empty() {
        return Err(AppError::Validation(
            "player_external_id is required".to_string(),
        ));
    }
    if !req.save_data.is_object() {
        return Err(AppError::Validation(
            "save_data must be a JSON object".to_string(),
        ));
    }

    let save_name = req.save_name.as_deref().unwrap_or("Untitled Save");

    let save = save_repo::upsert(
        &state.db,
        &game_id,
        &req.player_external_id,
        save_name,
        req.save_data,
        req.version,
    )
    .await?;

    tracing::debug!("💾 Save written: {} / {}", game_id, save.save_name);

    Ok(Json(serde_json::json!({
        "message": "Save stored successfully",
        "save": save,
    })))
}

/// Deletes a save slot.
#[axum::debug_handler]
pub async fn delete_save(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((game_id, save_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>> {
    find_owned(&state, &user, &game_id).await?;

    let deleted = save_repo::delete(&state.db, &game_id, &save_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(serde_json::json!({
        "message": "Save deleted successfully",
    })))
}

/// Summarizes the shape of a game's save blobs: top-level field name to
/// JSON type, sampled over recent saves.
#[axum::debug_handler]
pub async fn save_schema(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<Value>> {
    find_owned(&state, &user, &game_id).await?;

    let payloads = save_repo::recent_payloads(&state.db, &game_id, SCHEMA_SAMPLE_SIZE).await?;
    let fields = save_service::infer_fields(&payloads);

    Ok(Json(serde_json::json!({
        "sampled": payloads.len(),
        "fields": fields,
    })))
}
