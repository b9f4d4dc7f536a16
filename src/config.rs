use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::validation::{DEFAULT_MAX_DURATION_MINUTES, DEFAULT_MIN_DURATION_MINUTES, SessionPolicy};

pub const ADDR_ENV: &str = "WORKOUT_SCHEDULE_HTTP_ADDR";
pub const DB_ENV: &str = "WORKOUT_SCHEDULE_DB";
pub const MIN_DURATION_ENV: &str = "WORKOUT_SCHEDULE_MIN_DURATION";
pub const MAX_DURATION_ENV: &str = "WORKOUT_SCHEDULE_MAX_DURATION";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the HTTP service, read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub addr: SocketAddr,
    /// SQLite database backing the service; records stay in memory when unset.
    pub database_path: Option<PathBuf>,
    pub policy: SessionPolicy,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let raw_addr = get(ADDR_ENV).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidValue {
                name: ADDR_ENV,
                value: raw_addr.clone(),
                reason: err.to_string(),
            })?;

        let database_path = get(DB_ENV).map(|p| PathBuf::from(p.trim()));

        let min = parse_u32(MIN_DURATION_ENV, get(MIN_DURATION_ENV), DEFAULT_MIN_DURATION_MINUTES)?;
        let max = parse_u32(MAX_DURATION_ENV, get(MAX_DURATION_ENV), DEFAULT_MAX_DURATION_MINUTES)?;
        let policy = SessionPolicy::new(min, max).map_err(|err| ConfigError::InvalidValue {
            name: MIN_DURATION_ENV,
            value: format!("{min}..={max}"),
            reason: err.to_string(),
        })?;

        Ok(Self {
            addr,
            database_path,
            policy,
        })
    }
}

fn parse_u32(name: &'static str, raw: Option<String>, default: u32) -> Result<u32, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|err| ConfigError::InvalidValue {
                name,
                value,
                reason: err.to_string(),
            }),
    }
}
