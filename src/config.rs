use std::env;
use anyhow::{Context, Result};

/// The default browser session duration, in hours (7 days).
pub const DEFAULT_SESSION_HOURS: i64 = 168;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The duration of a session in hours.
    pub session_duration_hours: i64,
    /// Whether the app runs in production (controls the `secure` cookie flag).
    pub is_production: bool,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let session_duration_hours: i64 = env::var("SESSION_DURATION_HOURS")
            .unwrap_or_else(|_| DEFAULT_SESSION_HOURS.to_string())
            .parse()
            .context("Invalid SESSION_DURATION_HOURS")?;

        if session_duration_hours <= 0 {
            anyhow::bail!("SESSION_DURATION_HOURS must be positive");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            session_duration_hours,
            is_production: env::var("APP_ENV")
                .unwrap_or_else(|_| "development".to_string())
                == "production",
        })
    }
}
