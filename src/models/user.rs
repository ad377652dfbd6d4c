use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a registered developer, keyed by the stable external id
/// issued by the upstream identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The stable external id issued by the identity provider.
    pub external_id: String,
    /// The user's display name.
    pub name: Option<String>,
    /// The user's email address.
    pub email: Option<String>,
    /// The user's avatar URL.
    pub avatar: Option<String>,
    /// The id of the provider team/tenant the user belongs to.
    pub team_id: Option<String>,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the user's profile was last refreshed.
    pub updated_at: DateTime<Utc>,
}
