use std::env;
use std::fmt;
use thiserror::Error;

/// How much an error response reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Message, debug rendering and source chain.
    Verbose,
    /// `{ success: false, message }`, with a generic message for internal errors.
    Terse,
}

impl ErrorMode {
    /// `development` selects verbose errors; every other environment is terse.
    pub fn from_app_env(value: &str) -> Self {
        if value.eq_ignore_ascii_case("development") {
            ErrorMode::Verbose
        } else {
            ErrorMode::Terse
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .finish()
    }
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Token, cookie and reset-window settings shared by the credential service
/// and the handlers that set the `token` cookie.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expires_days: i64,
    pub cookie_expires_days: i64,
    pub bcrypt_cost: u32,
    pub reset_token_ttl_minutes: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expires_days", &self.jwt_expires_days)
            .field("cookie_expires_days", &self.cookie_expires_days)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("reset_token_ttl_minutes", &self.reset_token_ttl_minutes)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub error_mode: ErrorMode,
    pub auth: AuthConfig,
    pub smtp: SmtpConfig,
    pub cloudinary: CloudinaryConfig,
    pub default_avatar_url: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Reads the whole configuration once at start-up.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port: parse_or("PORT", 4000)?,
            database_url: required("DATABASE_URL")?,
            error_mode: ErrorMode::from_app_env(&var_or("APP_ENV", "production")),
            auth: AuthConfig {
                jwt_secret: required("JWT_SECRET")?,
                jwt_expires_days: parse_or("JWT_EXPIRES_TIME", 7)?,
                cookie_expires_days: parse_or("COOKIE_EXPIRES_TIME", 7)?,
                bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
                reset_token_ttl_minutes: parse_or("RESET_TOKEN_TTL_MINUTES", 30)?,
            },
            smtp: SmtpConfig {
                host: var_or("SMTP_HOST", "localhost"),
                port: parse_or("SMTP_PORT", 587)?,
                username: var_or("SMTP_USERNAME", ""),
                password: var_or("SMTP_PASSWORD", ""),
                from_email: var_or("SMTP_FROM_EMAIL", "noreply@storefront.local"),
                from_name: var_or("SMTP_FROM_NAME", "Storefront"),
            },
            cloudinary: CloudinaryConfig {
                cloud_name: var_or("CLOUDINARY_CLOUD_NAME", ""),
                api_key: var_or("CLOUDINARY_API_KEY", ""),
                api_secret: var_or("CLOUDINARY_API_SECRET", ""),
            },
            default_avatar_url: var_or(
                "DEFAULT_AVATAR_URL",
                "https://res.cloudinary.com/demo/image/upload/avatar.png",
            ),
            cors_origins: var_or("CORS_ORIGINS", "http://localhost:3000")
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
