use axum::{extract::State, Extension, Json};

use crate::{
    error::Result,
    models::user::User,
    services::dashboard as dashboard_service,
    state::AppState,
};

/// Returns aggregate statistics across the caller's games for the
/// dashboard landing view.
#[axum::debug_handler]
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<serde_json::Value>> {
    let summary = dashboard_service::summary(&state, &user.external_id).await?;
    Ok(Json(serde_json::json!({ "summary": summary })))
}
