use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::time::Duration;

use crate::{
    error::{AppError, Result},
    models::user::User,
    repositories::user as user_repo,
    services::auth::{self, SESSION_COOKIE},
    state::AppState,
};

/// The verified identity handed over by the upstream OAuth collaborator
/// once the provider's code exchange has completed.
#[derive(Deserialize, Debug)]
pub struct VerifiedProfile {
    pub external_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub team_id: Option<String>,
}

/// The response payload for a completed login.
#[derive(Serialize)]
pub struct LoginResponse {
    /// The opaque session token, also set as the session cookie. Returned
    /// so non-browser clients can present it as a bearer header.
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: User,
}

/// The response payload for logout.
#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

/// Creates the session cookie, aligned with the session's own expiry.
fn create_session_cookie(value: String, max_age_secs: i64, is_production: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);

    if is_production {
        cookie.set_secure(true);
    }

    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::seconds(max_age_secs));
    cookie.set_path("/");

    cookie
}

/// Completes a login: upserts the identity, issues a session, and sets
/// the session cookie.
#[axum::debug_handler]
pub async fn complete_login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(profile): Json<VerifiedProfile>,
) -> Result<impl IntoResponse> {
    if profile.external_id.trim().is_empty() {
        return Err(AppError::Validation(
            "external_id cannot be empty".to_string(),
        ));
    }

    tracing::info!("🔐 Completing login for: {}", profile.external_id);

    let user = user_repo::upsert_by_external_id(
        &state.db,
        &profile.external_id,
        profile.name,
        profile.email,
        profile.avatar,
        profile.team_id,
    )
    .await?;

    let session = auth::create_session(&state, &user).await?;

    let cookie = create_session_cookie(
        session.token.clone(),
        auth::cookie_max_age(session.expires_at),
        state.config.is_production,
    );
    cookies.add(cookie);

    tracing::info!("✅ User logged in: {}", user.external_id);

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            user,
        }),
    ))
}

/// Returns the authenticated identity.
#[axum::debug_handler]
pub async fn me(Extension(user): Extension<User>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "user": user }))
}

/// Handles logout: revokes the presented session (if any) and expires
/// the cookie client-side.
///
/// Deliberately not behind the guard so a second logout with an already
/// dead token still succeeds.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<Response> {
    let cookie_value = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string());

    if let Some(token) = auth::extract_token(cookie_value.as_deref(), &headers) {
        auth::destroy_session(&state, &token).await?;
    }

    let mut expired = Cookie::new(SESSION_COOKIE, "");
    expired.set_max_age(Duration::seconds(0));
    expired.set_path("/");
    cookies.remove(expired);

    tracing::info!("👋 User logged out");

    Ok((
        StatusCode::OK,
        Json(LogoutResponse {
            success: true,
            message: "Logout successful".to_string(),
        }),
    )
        .into_response())
}
