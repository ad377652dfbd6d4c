use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::game::Game,
};

/// A helper function to map a `tokio_postgres::Row` to a `Game`.
fn row_to_game(row: &Row) -> Result<Game> {
    Ok(Game {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        owner_external_id: row.try_get("owner_external_id").map_err(|_| AppError::MissingData("owner_external_id".to_string()))?,
        name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
        description: row.try_get("description").map_err(|_| AppError::MissingData("description".to_string()))?,
        api_keys: row.try_get("api_keys").map_err(|_| AppError::MissingData("api_keys".to_string()))?,
        total_players: row.try_get("total_players").map_err(|_| AppError::MissingData("total_players".to_string()))?,
        active_players: row.try_get("active_players").map_err(|_| AppError::MissingData("active_players".to_string()))?,
        total_sessions: row.try_get("total_sessions").map_err(|_| AppError::MissingData("total_sessions".to_string()))?,
        average_session_secs: row.try_get("average_session_secs").map_err(|_| AppError::MissingData("average_session_secs".to_string()))?,
        last_played_at: row.try_get("last_played_at").map_err(|_| AppError::MissingData("last_played_at".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
        updated_at: row.try_get("updated_at").map_err(|_| AppError::MissingData("updated_at".to_string()))?,
    })
}

/// Creates a new game owned by the given user.
pub async fn create(
    pool: &Pool,
    owner_external_id: &str,
    name: String,
    description: Option<String>,
) -> Result<Game> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO games (id, owner_external_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
            &[&Uuid::new_v4(), &owner_external_id, &name, &description],
        )
        .await?;
    row_to_game(&row)
}

/// Lists a page of the owner's games, most recently updated first.
pub async fn list_by_owner(
    pool: &Pool,
    owner_external_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Game>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT *
            FROM games
            WHERE owner_external_id = $1
            ORDER BY updated_at DESC
            LIMIT $2 OFFSET $3
            "#,
            &[&owner_external_id, &limit, &offset],
        )
        .await?;
    rows.iter().map(row_to_game).collect()
}

/// Counts the owner's games.
pub async fn count_by_owner(pool: &Pool, owner_external_id: &str) -> Result<i64> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            SELECT COUNT(*) AS total
            FROM games
            WHERE owner_external_id = $1
            "#,
            &[&owner_external_id],
        )
        .await?;
    row.try_get("total").map_err(|_| AppError::MissingData("total".to_string()))
}

/// Finds a game by id, scoped to its owner.
///
/// Returns `None` both when the game does not exist and when it belongs
/// to someone else; callers surface that uniformly as 404.
pub async fn find_owned(
    pool: &Pool,
    game_id: &Uuid,
    owner_external_id: &str,
) -> Result<Option<Game>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM games
            WHERE id = $1 AND owner_external_id = $2
            "#,
            &[game_id, &owner_external_id],
        )
        .await?;
    row.map(|r| row_to_game(&r)).transpose()
}

/// Finds a game by id regardless of owner. Used only by the public
/// API-key validation endpoint.
pub async fn find_by_id(pool: &Pool, game_id: &Uuid) -> Result<Option<Game>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM games
            WHERE id = $1
            "#,
            &[game_id],
        )
        .await?;
    row.map(|r| row_to_game(&r)).transpose()
}

/// Applies a partial update to an owned game.
pub async fn update_owned(
    pool: &Pool,
    game_id: &Uuid,
    owner_external_id: &str,
    name: Option<String>,
    description: Option<String>,
) -> Result<Option<Game>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE games
            SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1 AND owner_external_id = $2
            RETURNING *
            "#,
            &[game_id, &owner_external_id, &name, &description],
        )
        .await?;
    row.map(|r| row_to_game(&r)).transpose()
}

/// Deletes an owned game. Player and save rows cascade.
///
/// Returns whether a row was actually removed.
pub async fn delete_owned(
    pool: &Pool,
    game_id: &Uuid,
    owner_external_id: &str,
) -> Result<bool> {
    let client = pool.get().await?;
    let deleted = client
        .execute(
            r#"
            DELETE FROM games
            WHERE id = $1 AND owner_external_id = $2
            "#,
            &[game_id, &owner_external_id],
        )
        .await?;
    Ok(deleted > 0)
}

/// Appends a freshly issued API key to an owned game.
pub async fn append_api_key(
    pool: &Pool,
    game_id: &Uuid,
    owner_external_id: &str,
    key: &str,
) -> Result<bool> {
    let client = pool.get().await?;
    let updated = client
        .execute(
            r#"
            UPDATE games
            SET api_keys = array_append(api_keys, $3), updated_at = NOW()
            WHERE id = $1 AND owner_external_id = $2
            "#,
            &[game_id, &owner_external_id, &key],
        )
        .await?;
    Ok(updated > 0)
}

/// Bumps play statistics when a new player first appears.
pub async fn record_new_player(pool: &Pool, game_id: &Uuid) -> Result<()> {
    let client = pool.get().await?;
    client
        .execute(
            r#"
            UPDATE games
            SET total_players = total_players + 1, last_played_at = NOW()
            WHERE id = $1
            "#,
            &[game_id],
        )
        .await?;
    Ok(())
}

/// Refreshes the last-played timestamp on returning-player activity.
pub async fn record_play(pool: &Pool, game_id: &Uuid) -> Result<()> {
    let client = pool.get().await?;
    client
        .execute(
            r#"
            UPDATE games
            SET total_sessions = total_sessions + 1, last_played_at = NOW()
            WHERE id = $1
            "#,
            &[game_id],
        )
        .await?;
    Ok(())
}
