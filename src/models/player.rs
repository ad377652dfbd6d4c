use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Represents a player record within a game.
///
/// `game_data` is an opaque, schema-less blob; the system intentionally
/// does not constrain game-specific shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// The unique identifier for the player record.
    pub id: Uuid,
    /// The game this player belongs to.
    pub game_id: Uuid,
    /// The game-chosen player identifier, unique per game.
    pub player_id: String,
    /// The player's external identity id, if known.
    pub external_id: Option<String>,
    /// Arbitrary game-specific data for this player.
    pub game_data: Value,
    /// Accumulated play time in seconds.
    pub total_play_time: i64,
    /// The timestamp of the player's last activity.
    pub last_played_at: DateTime<Utc>,
    /// The timestamp when the player record was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the player record was last updated.
    pub updated_at: DateTime<Utc>,
}
