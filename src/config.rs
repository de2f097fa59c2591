use crate::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration, read from the environment (and `.env` via `dotenv`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every API path is appended to, without a trailing slash.
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Default lifetime of a toast notification.
    pub toast_timeout: Duration,
    /// Delay between a successful password reset and the redirect to the login view.
    pub reset_redirect_delay: Duration,
    /// File backing the persisted `token`/`user` entries for the CLI.
    pub session_file: PathBuf,
}

impl Config {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(30),
            toast_timeout: Duration::from_millis(5000),
            reset_redirect_delay: Duration::from_millis(2000),
            session_file: PathBuf::from(".buildforge-session.json"),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        let api_base_url = env::var("API_BASE_URL")
            .map_err(|_| AppError::Config("API_BASE_URL must be set".into()))?;

        let mut config = Self::new(api_base_url);
        config.request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?);
        config.toast_timeout = Duration::from_millis(parse_var("TOAST_TIMEOUT_MS", 5000)?);
        config.reset_redirect_delay =
            Duration::from_millis(parse_var("RESET_REDIRECT_DELAY_MS", 2000)?);
        if let Ok(path) = env::var("SESSION_FILE") {
            config.session_file = PathBuf::from(path);
        }
        Ok(config)
    }

    /// Joins an API path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number", name))),
        Err(_) => Ok(default),
    }
}
