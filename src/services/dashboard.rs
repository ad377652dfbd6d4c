use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::{
    error::{AppError, Result},
    state::AppState,
};

/// Aggregate statistics over one owner's games, for the dashboard
/// landing view.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    /// How many games the owner has registered.
    pub total_games: i64,
    /// Distinct players across all of the owner's games.
    pub total_players: i64,
    /// Recently active players across all games.
    pub active_players: i64,
    /// API keys issued across all games.
    pub key_count: i64,
    /// Average play session length across games, in seconds.
    pub average_session_secs: i64,
    /// When any of the owner's games was last played.
    pub last_played_at: Option<DateTime<Utc>>,
}

/// Computes the owner's dashboard summary in a single aggregate query.
pub async fn summary(state: &AppState, owner_external_id: &str) -> Result<DashboardSummary> {
    let client = state.db.get().await?;
    let row = client
        .query_one(
            r#"
            SELECT
                COUNT(*) AS total_games,
                COALESCE(SUM(total_players), 0)::BIGINT AS total_players,
                COALESCE(SUM(active_players), 0)::BIGINT AS active_players,
                COALESCE(SUM(CARDINALITY(api_keys)), 0)::BIGINT AS key_count,
                COALESCE(AVG(average_session_secs), 0)::BIGINT AS average_session_secs,
                MAX(last_played_at) AS last_played_at
            FROM games
            WHERE owner_external_id = $1
            "#,
            &[&owner_external_id],
        )
        .await?;

    Ok(DashboardSummary {
        total_games: row.try_get("total_games").map_err(|_| AppError::MissingData("total_games".to_string()))?,
        total_players: row.try_get("total_players").map_err(|_| AppError::MissingData("total_players".to_string()))?,
        active_players: row.try_get("active_players").map_err(|_| AppError::MissingData("active_players".to_string()))?,
        key_count: row.try_get("key_count").map_err(|_| AppError::MissingData("key_count".to_string()))?,
        average_session_secs: row.try_get("average_session_secs").map_err(|_| AppError::MissingData("average_session_secs".to_string()))?,
        last_played_at: row.try_get("last_played_at").map_err(|_| AppError::MissingData("last_played_at".to_string()))?,
    })
}
