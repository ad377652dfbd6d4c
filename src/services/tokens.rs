use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};

use crate::config::DEFAULT_SESSION_HOURS;

/// The number of random bytes in a token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Generates an opaque, effectively-unguessable token: 32 bytes from the
/// OS entropy source, hex-encoded to 64 characters.
///
/// Pure generation; an entropy-source failure is a process-level fault.
pub fn generate() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generates a token together with its expiry timestamp.
///
/// # Arguments
///
/// * `duration_hours` - How long the token lives; defaults to 7 days
///   when `None`.
///
/// # Returns
///
/// A `(token, expires_at)` pair with `expires_at = now + duration`.
pub fn generate_with_expiry(duration_hours: Option<i64>) -> (String, DateTime<Utc>) {
    let hours = duration_hours.unwrap_or(DEFAULT_SESSION_HOURS);
    (generate(), Utc::now() + Duration::hours(hours))
}
