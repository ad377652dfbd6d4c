use deadpool_postgres::Pool;
use serde_json::Value;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::save::Save,
};

/// A helper function to map a `tokio_postgres::Row` to a `Save`.
fn row_to_save(row: &Row) -> Result<Save> {
    Ok(Save {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        game_id: row.try_get("game_id").map_err(|_| AppError::MissingData("game_id".to_string()))?,
        player_external_id: row.try_get("player_external_id").map_err(|_| AppError::MissingData("player_external_id".to_string()))?,
        save_name: row.try_get("save_name").map_err(|_| AppError::MissingData("save_name".to_string()))?,
        save_data: row.try_get("save_data").map_err(|_| AppError::MissingData("save_data".to_string()))?,
        version: row.try_get("version").map_err(|_| AppError::MissingData("version".to_string()))?,
        last_played: row.try_get("last_played").map_err(|_| AppError::MissingData("last_played".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
        updated_at: row.try_get("updated_at").map_err(|_| AppError::MissingData("updated_at".to_string()))?,
    })
}

/// Lists a player's saves for a game, most recently played first.
pub async fn list_for_player(
    pool: &Pool,
    game_id: &Uuid,
    player_external_id: &str,
) -> Result<Vec<Save>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT *
            FROM saves
            WHERE game_id = $1 AND player_external_id = $2
            ORDER BY last_played DESC
            "#,
            &[game_id, &player_external_id],
        )
        .await?;
    rows.iter().map(row_to_save).collect()
}

/// Creates a named save or merges new data into the existing slot.
///
/// The new payload is shallow-merged over the stored blob and the
/// last-played timestamp refreshes, mirroring how game clients push
/// incremental state.
pub async fn upsert(
    pool: &Pool,
    game_id: &Uuid,
    player_external_id: &str,
    save_name: &str,
    save_data: Value,
    version: Option<String>,
) -> Result<Save> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO saves (id, game_id, player_external_id, save_name, save_data, version)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (game_id, player_external_id, save_name) DO UPDATE SET
                save_data = saves.save_data || EXCLUDED.save_data,
                version = COALESCE(EXCLUDED.version, saves.version),
                last_played = NOW(),
                updated_at = NOW()
            RETURNING *
            "#,
            &[&Uuid::new_v4(), game_id, &player_external_id, &save_name, &save_data, &version],
        )
        .await?;
    row_to_save(&row)
}

/// Deletes a save within a game. Returns whether a row was removed.
pub async fn delete(pool: &Pool, game_id: &Uuid, save_id: &Uuid) -> Result<bool> {
    let client = pool.get().await?;
    let deleted = client
        .execute(
            r#"
            DELETE FROM saves
            WHERE id = $1 AND game_id = $2
            "#,
            &[save_id, game_id],
        )
        .await?;
    Ok(deleted > 0)
}

/// Fetches recent save payloads for schema introspection.
pub async fn recent_payloads(
    pool: &Pool,
    game_id: &Uuid,
    limit: i64,
) -> Result<Vec<Value>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT save_data
            FROM saves
            WHERE game_id = $1
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
            &[game_id, &limit],
        )
        .await?;
    rows.iter()
        .map(|r| {
            r.try_get("save_data")
                .map_err(|_| AppError::MissingData("save_data".to_string()))
        })
        .collect()
}
