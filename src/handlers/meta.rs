use axum::Json;

/// Returns the API's name and version.
#[axum::debug_handler]
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "playvault API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
