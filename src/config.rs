use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::sequence::{CodeFormat, KindRegistry, RetryPolicy};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub jwt_secret: String,
    pub sequence_retry: RetryPolicy,
    /// Server-side limit on each counter statement.
    pub sequence_statement_timeout: Duration,
    pub sequence_kinds: KindRegistry,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let mut sequence_kinds = KindRegistry::default();
        if let Some(entries) = lookup("SEQUENCE_KINDS") {
            for (kind, format) in parse_kinds(&entries)? {
                sequence_kinds.insert(kind, format);
            }
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parse_or(&lookup, "PORT", 3000)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout: Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5)?),
            jwt_secret: required("JWT_SECRET")?,
            sequence_retry: RetryPolicy {
                max_attempts: parse_or(&lookup, "SEQUENCE_MAX_ATTEMPTS", 5)?,
                backoff: Duration::from_millis(parse_or(&lookup, "SEQUENCE_RETRY_BACKOFF_MS", 10)?),
            },
            sequence_statement_timeout: Duration::from_millis(parse_or(
                &lookup,
                "SEQUENCE_STORE_TIMEOUT_MS",
                5000,
            )?),
            sequence_kinds,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Parses `Kind=PREFIX:WIDTH` entries separated by commas.
fn parse_kinds(entries: &str) -> Result<Vec<(String, CodeFormat)>, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name: "SEQUENCE_KINDS",
        value: entries.to_string(),
    };

    entries.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (kind, format) = entry.split_once('=').ok_or_else(invalid)?;
            let (prefix, width) = format.split_once(':').ok_or_else(invalid)?;
            let kind = kind.trim();
            let width: usize = width.trim().parse().map_err(|_| invalid())?;
            if kind.is_empty() {
                return Err(invalid());
            }
            Ok((kind.to_string(), CodeFormat::new(prefix.trim(), width)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    const BASE: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/stockroom"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.sequence_retry.max_attempts, 5);
        assert_eq!(config.sequence_statement_timeout, Duration::from_secs(5));
        assert_eq!(config.sequence_kinds.get("Brand"), Some(&CodeFormat::new("BRD", 3)));
    }

    #[test]
    fn missing_database_url_is_reported() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "secret")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn bad_number_names_the_variable() {
        let mut vars = BASE.to_vec();
        vars.push(("PORT", "eighty"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn sequence_kinds_override_and_extend_defaults() {
        let mut vars = BASE.to_vec();
        vars.push(("SEQUENCE_KINDS", "Product=PRD:5, Warehouse=WH:2"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.sequence_kinds.get("Product"), Some(&CodeFormat::new("PRD", 5)));
        assert_eq!(config.sequence_kinds.get("Warehouse"), Some(&CodeFormat::new("WH", 2)));
        assert_eq!(config.sequence_kinds.get("Brand"), Some(&CodeFormat::new("BRD", 3)));
    }

    #[test]
    fn malformed_sequence_kinds_are_rejected() {
        for bad in ["Product", "Product=PRD", "Product=PRD:x", "=PRD:3"] {
            assert!(parse_kinds(bad).is_err(), "{bad} should not parse");
        }
    }
}
