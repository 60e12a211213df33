use std::env;
use std::fmt::Display;
use std::str::FromStr;

use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("Invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres(DatabaseConfig),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub jwt_secret: String,
    pub workers: usize,
    pub storage: StorageBackend,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Empty("JWT_SECRET"));
        }

        let backend = lookup("STORAGE_BACKEND").unwrap_or_else(|| "postgres".to_string());
        let storage = match backend.to_ascii_lowercase().as_str() {
            "postgres" => StorageBackend::Postgres(DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout_secs: parse_or(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?,
            }),
            "memory" => {
                warn!("Using in-memory storage; activities will not survive a restart");
                StorageBackend::Memory
            }
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    message: format!("expected postgres or memory, got {other}"),
                })
            }
        };

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            jwt_secret,
            workers: parse_or(&lookup, "WORKERS", num_cpus::get())?,
            storage,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn postgres_is_the_default_backend() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("DATABASE_URL", "postgres://localhost/timeflow"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(
            config.storage,
            StorageBackend::Postgres(DatabaseConfig {
                url: "postgres://localhost/timeflow".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 5,
            })
        );
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("STORAGE_BACKEND", "memory"),
            ("WORKERS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn secret_is_required_and_non_empty() {
        let err = Config::from_lookup(lookup(&[("STORAGE_BACKEND", "memory")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", ""), ("STORAGE_BACKEND", "memory")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty("JWT_SECRET"));
    }

    #[test]
    fn rejects_malformed_values() {
        let err = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("STORAGE_BACKEND", "memory"),
            ("WORKERS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "WORKERS", .. }));

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "secret"), ("STORAGE_BACKEND", "sqlite")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORAGE_BACKEND", .. }));
    }
}
