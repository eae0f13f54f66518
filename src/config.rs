use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;
pub const DEFAULT_MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;
pub const DEFAULT_MAX_LOGO_DIMENSION: u32 = 2048;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Runtime settings, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub bind_address: String,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub jwt_secret: String,
    pub data_dir: PathBuf,
    pub history_capacity: usize,
    pub max_logo_bytes: usize,
    pub max_logo_dimension: u32,
    pub max_sessions: usize,
    pub session_idle_timeout: Duration,
    pub sign_in_path: String,
    pub cors_origins: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => default_cors_origins(),
        };

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),
            mongodb_uri: env::var("MONGODB_URI").ok().filter(|uri| !uri.is_empty()),
            mongodb_database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| "quickqr".to_string()),
            jwt_secret,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            history_capacity: parse_var("HISTORY_CAPACITY", DEFAULT_HISTORY_CAPACITY)?,
            max_logo_bytes: parse_var("MAX_LOGO_BYTES", DEFAULT_MAX_LOGO_BYTES)?,
            max_logo_dimension: parse_var("MAX_LOGO_DIMENSION", DEFAULT_MAX_LOGO_DIMENSION)?,
            max_sessions: parse_var("MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?,
            session_idle_timeout: Duration::from_secs(parse_var(
                "SESSION_IDLE_SECS",
                DEFAULT_SESSION_IDLE_SECS,
            )?),
            sign_in_path: env::var("SIGN_IN_PATH").unwrap_or_else(|_| "/login".to_string()),
            cors_origins,
        })
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:4173".to_string(),
    ]
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Settings {
    /// Settings for handler tests: in-memory friendly, no remote store.
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            bind_address: "127.0.0.1".to_string(),
            mongodb_uri: None,
            mongodb_database: "quickqr_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            data_dir: PathBuf::from("data"),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_logo_bytes: DEFAULT_MAX_LOGO_BYTES,
            max_logo_dimension: DEFAULT_MAX_LOGO_DIMENSION,
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            sign_in_path: "/login".to_string(),
            cors_origins: default_cors_origins(),
        }
    }
}
