use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a registered game.
///
/// Ownership is recorded as the owning user's external id directly, not
/// a foreign key to `users`, because that id is available at
/// authentication time without an extra join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// The unique identifier for the game.
    pub id: Uuid,
    /// The external id of the owning user.
    pub owner_external_id: String,
    /// The name of the game.
    pub name: String,
    /// The description of the game.
    pub description: Option<String>,
    /// The API keys issued for this game. Never serialized into
    /// responses.
    #[serde(skip_serializing, default)]
    pub api_keys: Vec<String>,
    /// The number of distinct players recorded for this game.
    pub total_players: i64,
    /// The number of recently active players.
    pub active_players: i64,
    /// The total number of play sessions recorded.
    pub total_sessions: i64,
    /// The average play session length in seconds.
    pub average_session_secs: i64,
    /// The timestamp of the most recent play activity.
    pub last_played_at: Option<DateTime<Utc>>,
    /// The timestamp when the game was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the game was last updated.
    pub updated_at: DateTime<Utc>,
}
