//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Starting balance for newly registered users.
pub const DEFAULT_NEW_USER_CREDITS: i64 = 1000;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    /// Bearer token lifetime.
    pub jwt_expire_hours: i64,
    /// Balance given to new registrations.
    pub new_user_credits: i64,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    /// Administrator ensured at start-up.
    pub admin: Option<AdminAccount>,
}

/// Bootstrap administrator credentials.
#[derive(Clone)]
pub struct AdminAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `API_ADDR` | Server bind address | `127.0.0.1:8001` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:chat.db?mode=rwc` |
    /// | `JWT_SECRET` | Token signing secret | (required) |
    /// | `JWT_EXPIRE_HOURS` | Token lifetime | `24` |
    /// | `NEW_USER_CREDITS` | Starting balance | `1000` |
    /// | `CORS_ORIGINS` | Comma-separated origins | (any) |
    /// | `ADMIN_USERNAME` / `ADMIN_EMAIL` / `ADMIN_PASSWORD` | Bootstrap admin | (none) |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8001".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:chat.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        let jwt_expire_hours = parse_number("JWT_EXPIRE_HOURS", 24)?;
        let new_user_credits = parse_number("NEW_USER_CREDITS", DEFAULT_NEW_USER_CREDITS)?;

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let admin = match (
            env::var("ADMIN_USERNAME").ok(),
            env::var("ADMIN_EMAIL").ok(),
            env::var("ADMIN_PASSWORD").ok(),
        ) {
            (Some(username), Some(email), Some(password)) => Some(AdminAccount {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => return Err(ConfigError::IncompleteAdmin),
        };

        Ok(Self {
            addr,
            database_url,
            jwt_secret,
            jwt_expire_hours,
            new_user_credits,
            cors_origins,
            admin,
        })
    }
}

fn parse_number(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API_ADDR format")]
    InvalidAddr,

    #[error("JWT_SECRET environment variable is required")]
    MissingJwtSecret,

    #[error("{0} must be an integer")]
    InvalidNumber(&'static str),

    #[error("ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD must be set together")]
    IncompleteAdmin,
}
