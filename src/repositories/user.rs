use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::user::User,
};

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        external_id: row.try_get("external_id").map_err(|_| AppError::MissingData("external_id".to_string()))?,
        name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
        email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
        avatar: row.try_get("avatar").map_err(|_| AppError::MissingData("avatar".to_string()))?,
        team_id: row.try_get("team_id").map_err(|_| AppError::MissingData("team_id".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
        updated_at: row.try_get("updated_at").map_err(|_| AppError::MissingData("updated_at".to_string()))?,
    })
}

/// Inserts or refreshes a user by their external id.
///
/// Subsequent logins refresh the stored profile fields; the row itself
/// is never deleted by this path.
pub async fn upsert_by_external_id(
    pool: &Pool,
    external_id: &str,
    name: Option<String>,
    email: Option<String>,
    avatar: Option<String>,
    team_id: Option<String>,
) -> Result<User> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO users (id, external_id, name, email, avatar, team_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (external_id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                avatar = EXCLUDED.avatar,
                team_id = EXCLUDED.team_id,
                updated_at = NOW()
            RETURNING *
            "#,
            &[&Uuid::new_v4(), &external_id, &name, &email, &avatar, &team_id],
        )
        .await?;
    row_to_user(&row)
}

/// Finds a user by their ID.
pub async fn find_by_id(pool: &Pool, user_id: &Uuid) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM users
            WHERE id = $1
            "#,
            &[user_id],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}
