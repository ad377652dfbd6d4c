use axum::{
    Router,
    routing::{get, post, put, delete},
    middleware::from_fn_with_state,
};

use http::{Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
    cors::CorsLayer,
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod state;
mod db;

mod models {
    pub mod user;
    pub mod session;
    pub mod game;
    pub mod player;
    pub mod save;
}

mod repositories {
    pub mod user;
    pub mod session;
    pub mod game;
    pub mod player;
    pub mod save;
}

mod services {
    pub mod tokens;
    pub mod auth;
    pub mod dashboard;
    pub mod saves;
}

mod handlers {
    pub mod auth;
    pub mod games;
    pub mod players;
    pub mod saves;
    pub mod keys;
    pub mod dashboard;
    pub mod meta;
}

mod middleware_layer {
    pub mod auth;
}

mod validation {
    pub mod games;
}

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    db::run_migrations(&state.db).await?;
    tracing::info!("✅ Database schema is up to date");

    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().unwrap(),
            "http://127.0.0.1:3000".parse().unwrap(),
            "http://[::1]:3000".parse().unwrap(),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400));

    let public_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(5)
            .burst_size(20)
            .use_headers()
            .finish()
            .unwrap(),
    );

    let public_routes = Router::new()
        .route("/api/v1", get(handlers::meta::api_info))
        .route("/api/v1/auth/callback", post(handlers::auth::complete_login))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/v1/games/{game_id}/keys/validate",
            post(handlers::keys::validate_key),
        )
        .layer(tower_governor::GovernorLayer::new(
            public_governor_conf.clone(),
        ))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/v1/auth/me", get(handlers::auth::me))
        .route("/api/v1/dashboard", get(handlers::dashboard::summary))
        .route("/api/v1/games", get(handlers::games::list_games))
        .route("/api/v1/games", post(handlers::games::create_game))
        .route("/api/v1/games/{game_id}", get(handlers::games::get_game))
        .route("/api/v1/games/{game_id}", put(handlers::games::update_game))
        .route("/api/v1/games/{game_id}", delete(handlers::games::delete_game))
        .route("/api/v1/games/{game_id}/keys", put(handlers::keys::issue_key))
        .route(
            "/api/v1/games/{game_id}/players",
            get(handlers::players::list_players),
        )
        .route(
            "/api/v1/games/{game_id}/players",
            post(handlers::players::upsert_player),
        )
        .route(
            "/api/v1/games/{game_id}/players/{player_id}",
            get(handlers::players::get_player),
        )
        .route(
            "/api/v1/games/{game_id}/players/{player_id}",
            delete(handlers::players::delete_player),
        )
        .route("/api/v1/games/{game_id}/data", get(handlers::saves::list_saves))
        .route("/api/v1/games/{game_id}/data", post(handlers::saves::upsert_save))
        .route(
            "/api/v1/games/{game_id}/data/schema",
            get(handlers::saves::save_schema),
        )
        .route(
            "/api/v1/games/{game_id}/data/{save_id}",
            delete(handlers::saves::delete_save),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(cors);

    let purge_state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            tracing::info!("🧹 Purging expired sessions...");
            match repositories::session::purge_expired(&purge_state.db).await {
                Ok(purged) => {
                    tracing::info!("✅ Purged {} expired sessions", purged);
                }
                Err(e) => {
                    tracing::error!("❌ Session purge failed: {}", e);
                }
            }
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("🚀 Server listening on http://{}", addr);
    tracing::info!("✅ Background session purge started (runs every hour)");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
