/*
 * Responsibility
 * - 環境変数 (.env 含む) から設定を読み込む
 * - session cookie 名 / session-state endpoint / admin role 名など
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::services::session::DEFAULT_VALIDATION_TIMEOUT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    // Off unless ABORT_ON_PANIC is set; the recoverer needs unwinding.
    pub abort_on_panic: bool,

    pub session_cookie_name: String,
    pub session_state_api: Url,
    pub session_validation_timeout: Duration,

    pub admin_role_name: String,
    pub developer_role_name: String,
    pub protected_username: String,

    // None = no whole-request timeout
    pub default_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. `from_env` is this over `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values are treated as unset.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port: u16 = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(get("APP_ENV").as_deref());
        let abort_on_panic = get("ABORT_ON_PANIC")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        let session_cookie_name = required("SESSION_COOKIE_NAME")?;

        let session_state_api = Url::parse(&required("SESSION_STATE_API")?)
            .map_err(|_| ConfigError::Invalid("SESSION_STATE_API"))?;
        if !matches!(session_state_api.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("SESSION_STATE_API"));
        }

        let session_validation_timeout = match get("SESSION_VALIDATION_TIMEOUT_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or(ConfigError::Invalid("SESSION_VALIDATION_TIMEOUT_MS"))?,
            None => DEFAULT_VALIDATION_TIMEOUT,
        };

        let admin_role_name = required("ADMIN_ROLE_NAME")?;
        let developer_role_name =
            get("DEVELOPER_ROLE_NAME").unwrap_or_else(|| "developer".to_string());
        let protected_username = required("PROTECTED_USERNAME")?;

        // Unparsable or zero means "no timeout", matching how the router treated it before.
        let default_timeout = get("DEFAULT_TIMEOUT_IN_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            addr,
            app_env,
            abort_on_panic,
            session_cookie_name,
            session_state_api,
            session_validation_timeout,
            admin_role_name,
            developer_role_name,
            protected_username,
            default_timeout,
        })
    }
}
