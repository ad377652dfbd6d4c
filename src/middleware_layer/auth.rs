use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    services::auth::{self, AuthOutcome, SESSION_COOKIE},
    state::AppState,
};

/// A middleware that requires a valid session before any protected
/// handler runs.
///
/// Runs ahead of body extraction, so an unauthenticated request is
/// rejected before its payload is ever parsed. On success the resolved
/// `User` is attached as a request extension for ownership checks.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking authentication...");

    let cookie_value = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string());

    match auth::require_auth(&state, cookie_value.as_deref(), request.headers()).await {
        AuthOutcome::Authenticated(user) => {
            tracing::debug!("✅ User authenticated: {}", user.external_id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        AuthOutcome::Unauthenticated(response) => {
            tracing::debug!("❌ No valid credential presented");
            response
        }
    }
}
