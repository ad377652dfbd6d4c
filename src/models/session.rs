use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a server-side session: an opaque token bound to a user
/// with a fixed, non-sliding expiry window.
///
/// A session is valid only while `now < expires_at`; validity is
/// re-checked on every lookup, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The opaque high-entropy token (64 hex characters).
    pub token: String,
    /// The ID of the user this session belongs to.
    pub user_id: Uuid,
    /// The user's external id, denormalized for ownership checks.
    pub external_id: String,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
}
