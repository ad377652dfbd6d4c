use deadpool_postgres::Pool;
use serde_json::Value;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::player::Player,
};

/// The columns player listings may be sorted by. Anything else is
/// rejected before it reaches SQL.
pub const SORTABLE_COLUMNS: [&str; 3] = ["last_played_at", "created_at", "total_play_time"];

/// A helper function to map a `tokio_postgres::Row` to a `Player`.
fn row_to_player(row: &Row) -> Result<Player> {
    Ok(Player {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        game_id: row.try_get("game_id").map_err(|_| AppError::MissingData("game_id".to_string()))?,
        player_id: row.try_get("player_id").map_err(|_| AppError::MissingData("player_id".to_string()))?,
        external_id: row.try_get("external_id").map_err(|_| AppError::MissingData("external_id".to_string()))?,
        game_data: row.try_get("game_data").map_err(|_| AppError::MissingData("game_data".to_string()))?,
        total_play_time: row.try_get("total_play_time").map_err(|_| AppError::MissingData("total_play_time".to_string()))?,
        last_played_at: row.try_get("last_played_at").map_err(|_| AppError::MissingData("last_played_at".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
        updated_at: row.try_get("updated_at").map_err(|_| AppError::MissingData("updated_at".to_string()))?,
    })
}

/// Lists a page of a game's players.
///
/// `sort_by` must be one of [`SORTABLE_COLUMNS`]; the column name is
/// interpolated only after that check.
pub async fn list_by_game(
    pool: &Pool,
    game_id: &Uuid,
    sort_by: &str,
    ascending: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Player>> {
    if !SORTABLE_COLUMNS.contains(&sort_by) {
        return Err(AppError::Validation(format!(
            "Cannot sort by '{}'",
            sort_by
        )));
    }

    let order = if ascending { "ASC" } else { "DESC" };
    let query = format!(
        r#"
        SELECT *
        FROM players
        WHERE game_id = $1
        ORDER BY {} {}
        LIMIT $2 OFFSET $3
        "#,
        sort_by, order
    );

    let client = pool.get().await?;
    let rows = client
        .query(query.as_str(), &[game_id, &limit, &offset])
        .await?;
    rows.iter().map(row_to_player).collect()
}

/// Counts a game's players.
pub async fn count_by_game(pool: &Pool, game_id: &Uuid) -> Result<i64> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            SELECT COUNT(*) AS total
            FROM players
            WHERE game_id = $1
            "#,
            &[game_id],
        )
        .await?;
    row.try_get("total").map_err(|_| AppError::MissingData("total".to_string()))
}

/// Finds a single player record within a game.
pub async fn find_one(
    pool: &Pool,
    game_id: &Uuid,
    player_id: &str,
) -> Result<Option<Player>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM players
            WHERE game_id = $1 AND player_id = $2
            "#,
            &[game_id, &player_id],
        )
        .await?;
    row.map(|r| row_to_player(&r)).transpose()
}

/// Creates a player record or merges into the existing one.
///
/// On conflict the new `game_data` is shallow-merged over the stored
/// blob (jsonb `||`), play time accumulates, and the activity timestamp
/// refreshes. Returns the row plus whether it was freshly inserted.
pub async fn upsert(
    pool: &Pool,
    game_id: &Uuid,
    player_id: &str,
    external_id: Option<String>,
    game_data: Value,
    play_time: i64,
) -> Result<(Player, bool)> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO players (id, game_id, player_id, external_id, game_data, total_play_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (game_id, player_id) DO UPDATE SET
                external_id = COALESCE(EXCLUDED.external_id, players.external_id),
                game_data = players.game_data || EXCLUDED.game_data,
                total_play_time = players.total_play_time + EXCLUDED.total_play_time,
                last_played_at = NOW(),
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
            &[&Uuid::new_v4(), game_id, &player_id, &external_id, &game_data, &play_time],
        )
        .await?;
    let inserted: bool = row
        .try_get("inserted")
        .map_err(|_| AppError::MissingData("inserted".to_string()))?;
    Ok((row_to_player(&row)?, inserted))
}

/// Deletes a player record. Returns whether a row was removed.
pub async fn delete(pool: &Pool, game_id: &Uuid, player_id: &str) -> Result<bool> {
    let client = pool.get().await?;
    let deleted = client
        .execute(
            r#"
            DELETE FROM players
            WHERE game_id = $1 AND player_id = $2
            "#,
            &[game_id, &player_id],
        )
        .await?;
    Ok(deleted > 0)
}
