//! Configuration module
//!
//! Environment-driven configuration for the API service: database, upload
//! storage, Telegram webhook, and cleanup settings.

use std::env;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;
// 10 MiB per photo, matching the web client's limit
const DEFAULT_MAX_UPLOAD_SIZE_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_UPLOAD_RETENTION_HOURS: i64 = 24;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 3600;

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    // Database
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Upload storage
    pub upload_dir: String,
    pub upload_base_url: String,
    pub max_upload_size_bytes: usize,
    /// Hours a photo may stay unattached to a report before the sweeper removes it.
    pub upload_retention_hours: i64,
    /// Seconds between sweeper runs. 0 disables cleanup.
    pub cleanup_interval_secs: u64,
    // Telegram bot boundary
    pub telegram_webhook_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let upload_dir =
            env::var("UPLOAD_DIR").unwrap_or_else(|_| "/var/lib/participium/photos".to_string());
        let upload_base_url = env::var("UPLOAD_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/photos".to_string());

        Ok(Config {
            server_port: parse_env("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origins: parse_list(env::var("CORS_ORIGINS").ok()),
            database_url,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_env("DB_TIMEOUT_SECONDS", DEFAULT_CONNECTION_TIMEOUT_SECS)?,
            upload_dir,
            upload_base_url,
            max_upload_size_bytes: parse_env(
                "MAX_UPLOAD_SIZE_BYTES",
                DEFAULT_MAX_UPLOAD_SIZE_BYTES,
            )?,
            upload_retention_hours: parse_env(
                "UPLOAD_RETENTION_HOURS",
                DEFAULT_UPLOAD_RETENTION_HOURS,
            )?,
            cleanup_interval_secs: parse_env(
                "UPLOAD_CLEANUP_INTERVAL_SECS",
                DEFAULT_CLEANUP_INTERVAL_SECS,
            )?,
            telegram_webhook_secret: env::var("TELEGRAM_WEBHOOK_SECRET").ok(),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
