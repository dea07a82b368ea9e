//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the server port, database URL, token secrets and lifetimes, and media-host
//! credentials. Everything is read once from the environment at startup.

use std::path::PathBuf;

use thiserror::Error;
use vidtube_adapters::CloudinaryConfig;

use crate::utils::non_empty;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_DB_NAME: &str = "vidtube";
const DEFAULT_TEMP_DIR: &str = "public/temp";
/// One day, matching the original deployment's access-token lifetime.
const DEFAULT_ACCESS_TTL_SECS: i64 = 86_400;
/// Ten days for the refresh token.
const DEFAULT_REFRESH_TTL_SECS: i64 = 864_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {name} is invalid: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Staging directory for multipart uploads before they reach the host.
    pub temp_dir: PathBuf,
    /// `None` when no credentials are configured; the server then falls
    /// back to the in-memory store and logs a warning.
    pub cloudinary: Option<CloudinaryConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub cors_origin: String,
    pub database: DatabaseConfig,
    pub tokens: TokenConfig,
    pub media: MediaConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_var(&get, "PORT", DEFAULT_PORT)?;
        let cors_origin = var_or(&get, "CORS_ORIGIN", DEFAULT_CORS_ORIGIN);

        let database = DatabaseConfig {
            url: required(&get, "MONGODB_URI")?,
            name: var_or(&get, "DB_NAME", DEFAULT_DB_NAME),
        };

        let access_ttl_secs = parse_var(&get, "ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_ttl_secs = parse_var(&get, "REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TTL_SECS)?;
        if access_ttl_secs <= 0 {
            return Err(ConfigError::InvalidVar {
                name: "ACCESS_TOKEN_TTL_SECS",
                reason: "must be positive".to_string(),
            });
        }
        if refresh_ttl_secs <= 0 {
            return Err(ConfigError::InvalidVar {
                name: "REFRESH_TOKEN_TTL_SECS",
                reason: "must be positive".to_string(),
            });
        }
        let tokens = TokenConfig {
            access_secret: required(&get, "ACCESS_TOKEN_SECRET")?,
            refresh_secret: required(&get, "REFRESH_TOKEN_SECRET")?,
            access_ttl_secs,
            refresh_ttl_secs,
        };

        let media = MediaConfig {
            temp_dir: PathBuf::from(var_or(&get, "MEDIA_TEMP_DIR", DEFAULT_TEMP_DIR)),
            cloudinary: cloudinary_from_lookup(&get)?,
        };

        Ok(Self {
            port,
            cors_origin,
            database,
            tokens,
            media,
        })
    }
}

/// Cloudinary credentials come as a group: the cloud name switches the
/// integration on, at which point key and secret become required.
fn cloudinary_from_lookup(
    get: &impl Fn(&str) -> Option<String>,
) -> Result<Option<CloudinaryConfig>, ConfigError> {
    let cloud_name = match get("CLOUDINARY_CLOUD_NAME").as_deref().and_then(non_empty) {
        Some(name) => name.to_string(),
        None => return Ok(None),
    };
    Ok(Some(CloudinaryConfig {
        cloud_name,
        api_key: required(get, "CLOUDINARY_API_KEY")?,
        api_secret: required(get, "CLOUDINARY_API_SECRET")?,
        folder: get("CLOUDINARY_FOLDER").as_deref().and_then(non_empty).map(str::to_string),
    }))
}

fn required(get: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String, ConfigError> {
    get(name)
        .as_deref()
        .and_then(non_empty)
        .map(str::to_string)
        .ok_or(ConfigError::MissingVar(name))
}

fn var_or(get: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    get(name)
        .as_deref()
        .and_then(non_empty)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match get(name).as_deref().and_then(non_empty) {
        Some(raw) => raw.parse().map_err(|err: T::Err| ConfigError::InvalidVar {
            name,
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}
