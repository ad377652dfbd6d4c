use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::session::Session,
};

/// A helper function to map a `tokio_postgres::Row` to a `Session`.
fn row_to_session(row: &Row) -> Result<Session> {
    Ok(Session {
        token: row.try_get("token").map_err(|_| AppError::MissingData("token".to_string()))?,
        user_id: row.try_get("user_id").map_err(|_| AppError::MissingData("user_id".to_string()))?,
        external_id: row.try_get("external_id").map_err(|_| AppError::MissingData("external_id".to_string()))?,
        expires_at: row.try_get("expires_at").map_err(|_| AppError::MissingData("expires_at".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// Persists a new session record.
///
/// Sessions are not deduplicated by user; multiple live sessions per
/// user coexist.
pub async fn create(
    pool: &Pool,
    token: &str,
    user_id: &Uuid,
    external_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<Session> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO sessions (token, user_id, external_id, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
            &[&token, user_id, &external_id, &expires_at],
        )
        .await?;
    row_to_session(&row)
}

/// Looks a session up by exact token match, enforcing expiry at read
/// time. An expired-but-not-yet-purged row is never returned.
pub async fn find_active(pool: &Pool, token: &str) -> Result<Option<Session>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM sessions
            WHERE token = $1 AND expires_at > NOW()
            "#,
            &[&token],
        )
        .await?;
    row.map(|r| row_to_session(&r)).transpose()
}

/// Removes a session. Idempotent: absence of a matching row is not an
/// error.
pub async fn delete(pool: &Pool, token: &str) -> Result<()> {
    let client = pool.get().await?;
    client
        .execute(
            r#"
            DELETE FROM sessions
            WHERE token = $1
            "#,
            &[&token],
        )
        .await?;
    Ok(())
}

/// Deletes all expired session rows and returns how many were removed.
///
/// Purely storage hygiene; `find_active` never depends on purge timing.
pub async fn purge_expired(pool: &Pool) -> Result<u64> {
    let client = pool.get().await?;
    let deleted = client
        .execute(
            r#"
            DELETE FROM sessions
            WHERE expires_at <= NOW()
            "#,
            &[],
        )
        .await?;
    Ok(deleted)
}
