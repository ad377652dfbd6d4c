use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::User,
    repositories::game as game_repo,
    services::tokens,
    state::AppState,
};

/// The request payload for validating an API key.
#[derive(Deserialize)]
pub struct ValidateKeyRequest {
    pub key: String,
}

/// Issues a new API key for one of the caller's games.
///
/// The plaintext key is returned exactly once, in this response.
#[axum::debug_handler]
pub async fn issue_key(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(game_id): Path<Uuid>,
) -> Result<Response> {
    let key = tokens::generate();

    let updated =
        game_repo::append_api_key(&state.db, &game_id, &user.external_id, &key).await?;
    if !updated {
        return Err(AppError::NotFound);
    }

    tracing::info!("🔑 API key issued for game: {}", game_id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "key": key })),
    )
        .into_response())
}

/// Validates a game client's API key. Public: this endpoint carries no
/// session and authenticates nothing; it only answers whether the key is
/// currently issued for the game.
#[axum::debug_handler]
pub async fn validate_key(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<ValidateKeyRequest>,
) -> Result<Json<serde_json::Value>> {
    if req.key.is_empty() {
        return Err(AppError::Validation("key is required".to_string()));
    }

    let game = game_repo::find_by_id(&state.db, &game_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // Scan every key so timing does not reveal which slot (if any) matched.
    let mut valid = false;
    for stored in &game.api_keys {
        valid |= bool::from(stored.as_bytes().ct_eq(req.key.as_bytes()));
    }

    if valid {
        Ok(Json(serde_json::json!({ "message": "Valid" })))
    } else {
        Err(AppError::NotFound)
    }
}
