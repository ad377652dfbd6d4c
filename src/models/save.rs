use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Represents a named save slot for a player within a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Save {
    /// The unique identifier for the save.
    pub id: Uuid,
    /// The game this save belongs to.
    pub game_id: Uuid,
    /// The external id of the player who owns the save.
    pub player_external_id: String,
    /// The name of the save slot.
    pub save_name: String,
    /// The opaque save payload.
    pub save_data: Value,
    /// The game-reported version of the save format.
    pub version: Option<String>,
    /// The timestamp of the last play against this save.
    pub last_played: DateTime<Utc>,
    /// The timestamp when the save was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the save was last updated.
    pub updated_at: DateTime<Utc>,
}
