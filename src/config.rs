use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

use crate::services::authenticator::DEFAULT_TOKEN_TTL_SECONDS;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 5;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    /// `None` allows any origin.
    pub frontend_origin: Option<String>,
    pub token_ttl: chrono::Duration,
    pub request_timeout: Duration,
    pub db_max_connections: u32,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let bind_addr = parse_or(&lookup, "BIND_ADDR", || {
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().ok()
        })?;
        let token_ttl_seconds: i64 =
            parse_or(&lookup, "TOKEN_TTL_SECONDS", || Some(DEFAULT_TOKEN_TTL_SECONDS))?;
        if token_ttl_seconds <= 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_SECONDS",
                value: token_ttl_seconds.to_string(),
            });
        }
        let request_timeout_seconds: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", || {
            Some(DEFAULT_REQUEST_TIMEOUT_SECONDS)
        })?;
        let db_max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", || {
            Some(DEFAULT_DB_MAX_CONNECTIONS)
        })?;

        let frontend_origin = lookup("FRONTEND_ORIGIN")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && v != "*");

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            bind_addr,
            frontend_origin,
            token_ttl: chrono::Duration::seconds(token_ttl_seconds),
            request_timeout: Duration::from_secs(request_timeout_seconds),
            db_max_connections,
            log_format,
        })
    }
}

fn parse_or<F, T, D>(lookup: &F, name: &'static str, default: D) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    D: FnOnce() -> Option<T>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => default().ok_or(ConfigError::Missing(name)),
    }
}
