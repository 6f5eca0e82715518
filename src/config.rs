use std::env;

use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_AUTH_API_URL: &str = "http://auth.localhost:8080";
const DEFAULT_STORAGE_PUBLIC_URL: &str =
    "http://storage.localhost:8080/object/public/chat-attachments";
pub const DEFAULT_ATTACHMENT_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set (environment or .env)")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub auth_api_url: String,
    pub storage_public_url: String,
    pub attachment_max_bytes: u64,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first if a `.env`
    /// file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            jwt_secret: required("AUTH_JWT_SECRET")?,
            auth_api_url: lookup("AUTH_API_URL")
                .unwrap_or_else(|| DEFAULT_AUTH_API_URL.to_string()),
            storage_public_url: lookup("STORAGE_PUBLIC_URL")
                .unwrap_or_else(|| DEFAULT_STORAGE_PUBLIC_URL.to_string()),
            attachment_max_bytes: parse_or(
                &lookup,
                "ATTACHMENT_MAX_BYTES",
                DEFAULT_ATTACHMENT_MAX_BYTES,
            )?,
        })
    }

    /// Config for tests and local tooling: in-memory database, fixed secret.
    pub fn for_database(database_url: &str, jwt_secret: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            jwt_secret: jwt_secret.to_string(),
            auth_api_url: DEFAULT_AUTH_API_URL.to_string(),
            storage_public_url: DEFAULT_STORAGE_PUBLIC_URL.to_string(),
            attachment_max_bytes: DEFAULT_ATTACHMENT_MAX_BYTES,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
