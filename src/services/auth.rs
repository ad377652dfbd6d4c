use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::{
    error::Result,
    models::{session::Session, user::User},
    repositories::{session as session_repo, user as user_repo},
    services::tokens,
    state::AppState,
};

/// The canonical session cookie name. The bearer header carries the same
/// opaque token for non-browser clients.
pub const SESSION_COOKIE: &str = "session_token";

/// The outcome of the access guard: either a resolved identity, or the
/// 401 response to return in its place.
pub enum AuthOutcome {
    /// A valid, unexpired credential resolved to this user.
    Authenticated(User),
    /// No usable credential; the wrapped response is the uniform 401.
    Unauthenticated(Response),
}

/// A short, log-safe prefix of a token. Tokens are normally 64 hex
/// chars, but rows written by hand may be shorter.
fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

/// Extracts the session token from the request's credential carriers.
///
/// Policy, not accident: the cookie is checked first, the
/// `Authorization: Bearer` header is the fallback for non-browser
/// clients.
pub fn extract_token(cookie_value: Option<&str>, headers: &HeaderMap) -> Option<String> {
    if let Some(token) = cookie_value {
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}

/// Resolves a presented credential to a user identity.
///
/// Returns `None` for every unauthenticated state: no token, no active
/// session, or a session pointing at a deleted user. Persistence errors
/// also resolve to `None` (fail closed) and are logged for operators.
/// The lookup never renews or rotates the session; expiry is fixed.
pub async fn resolve_identity(
    state: &AppState,
    cookie_value: Option<&str>,
    headers: &HeaderMap,
) -> Option<User> {
    let token = extract_token(cookie_value, headers)?;

    let session = match session_repo::find_active(&state.db, &token).await {
        Ok(Some(session)) => session,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!("❌ Session lookup failed, treating as unauthenticated: {}", e);
            return None;
        }
    };

    match user_repo::find_by_id(&state.db, &session.user_id).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            // A dangling session must never resolve to a phantom identity.
            tracing::warn!(
                "⚠️ Session {} references missing user {}",
                token_prefix(&session.token),
                session.user_id
            );
            None
        }
        Err(e) => {
            tracing::error!("❌ User lookup failed, treating as unauthenticated: {}", e);
            None
        }
    }
}

/// The access guard: requires a resolved identity or short-circuits with
/// a structured 401.
pub async fn require_auth(
    state: &AppState,
    cookie_value: Option<&str>,
    headers: &HeaderMap,
) -> AuthOutcome {
    match resolve_identity(state, cookie_value, headers).await {
        Some(user) => AuthOutcome::Authenticated(user),
        None => AuthOutcome::Unauthenticated(
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "message": "Authentication required" })),
            )
                .into_response(),
        ),
    }
}

/// Issues a new session for a user and persists it.
///
/// # Returns
///
/// A `Result` containing the created `Session`.
pub async fn create_session(state: &AppState, user: &User) -> Result<Session> {
    let (token, expires_at) =
        tokens::generate_with_expiry(Some(state.config.session_duration_hours));
    let session = session_repo::create(
        &state.db,
        &token,
        &user.id,
        &user.external_id,
        expires_at,
    )
    .await?;
    tracing::info!("✅ Session created for user: {}", user.external_id);
    Ok(session)
}

/// Revokes the session behind a presented token, if any. Idempotent.
pub async fn destroy_session(state: &AppState, token: &str) -> Result<()> {
    session_repo::delete(&state.db, token).await?;
    tracing::info!("✅ Session revoked");
    Ok(())
}

/// How long a session cookie should live, derived from the session's
/// own expiry so the two never drift.
pub fn cookie_max_age(expires_at: DateTime<Utc>) -> i64 {
    (expires_at - Utc::now()).num_seconds().max(0)
}
