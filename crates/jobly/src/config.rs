//! Database configuration.
//!
//! Read either from the environment (`.env` files are honoured through
//! `dotenvy`) or from a TOML file:
//!
//! ```toml
//! [database]
//! url = "postgres://${PGUSER}@localhost/jobly"
//! max_pool_size = 8
//! slow_query_ms = 250
//! ```
//!
//! `${VAR}` references in the URL are expanded from the environment.

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_POOL_SIZE: usize = 16;

/// Connection settings for the jobly database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub max_pool_size: usize,
    /// Statements at or above this many milliseconds are logged at `WARN`.
    #[serde(default)]
    pub slow_query_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database: DbConfig,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pool_size: DEFAULT_POOL_SIZE,
            slow_query_ms: None,
        }
    }

    /// Build from `DATABASE_URL`, `JOBLY_POOL_SIZE` and `JOBLY_SLOW_QUERY_MS`.
    pub fn from_env() -> JoblyResult<Self> {
        dotenvy::dotenv().ok();

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| JoblyError::Config("DATABASE_URL is not set".into()))?;
        let mut config = Self::new(url);

        if let Some(size) = env_number("JOBLY_POOL_SIZE")? {
            config.max_pool_size = size as usize;
        }
        config.slow_query_ms = env_number("JOBLY_SLOW_QUERY_MS")?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document with a `[database]` table.
    pub fn from_toml_str(raw: &str) -> JoblyResult<Self> {
        let file: ConfigFile =
            toml::from_str(raw).map_err(|e| JoblyError::Config(format!("invalid config: {e}")))?;
        let mut config = file.database;
        config.url = expand_env_vars(&config.url)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn slow_query_threshold(&self) -> Option<Duration> {
        self.slow_query_ms.map(Duration::from_millis)
    }

    fn validate(&self) -> JoblyResult<()> {
        if self.url.trim().is_empty() {
            return Err(JoblyError::Config("database url is empty".into()));
        }
        if self.max_pool_size == 0 {
            return Err(JoblyError::Config("max_pool_size must be at least 1".into()));
        }
        Ok(())
    }
}

fn env_number(key: &str) -> JoblyResult<Option<u64>> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| JoblyError::Config(format!("{key} must be a non-negative integer, got {v:?}"))),
        Err(_) => Ok(None),
    }
}

fn expand_env_vars(input: &str) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' || chars.peek() != Some(&'{') {
            out.push(c);
            continue;
        }
        chars.next();

        let mut key = String::new();
        let mut closed = false;
        for ch in chars.by_ref() {
            if ch == '}' {
                closed = true;
                break;
            }
            key.push(ch);
        }

        if !closed {
            return Err(JoblyError::Config(format!(
                "unterminated env var reference: ${{{key}"
            )));
        }
        if key.is_empty() {
            return Err(JoblyError::Config("empty env var reference: ${}".into()));
        }
        let value = std::env::var(&key)
            .map_err(|_| JoblyError::Config(format!("missing env var for config: {key}")))?;
        out.push_str(&value);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_database_table_with_defaults() {
        let config = DbConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://localhost/jobly"
            "#,
        )
        .unwrap();
        assert_eq!(config.url, "postgres://localhost/jobly");
        assert_eq!(config.max_pool_size, 16);
        assert_eq!(config.slow_query_threshold(), None);
    }

    #[test]
    fn parses_tuning_fields() {
        let config = DbConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://localhost/jobly"
            max_pool_size = 4
            slow_query_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.max_pool_size, 4);
        assert_eq!(config.slow_query_threshold(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn rejects_unknown_keys_and_zero_pool() {
        let err = DbConfig::from_toml_str("[database]\nurl = \"x\"\nport = 1\n").unwrap_err();
        assert!(matches!(err, JoblyError::Config(_)));

        let err = DbConfig::from_toml_str("[database]\nurl = \"x\"\nmax_pool_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_pool_size"));
    }

    #[test]
    fn expands_env_references() {
        // PATH is set in every test environment.
        let path = std::env::var("PATH").unwrap();
        assert_eq!(expand_env_vars("a${PATH}b").unwrap(), format!("a{path}b"));
        assert_eq!(expand_env_vars("$HOME").unwrap(), "$HOME");
        assert!(expand_env_vars("${PATH").is_err());
        assert!(expand_env_vars("${}").is_err());
        assert!(expand_env_vars("${JOBLY_SURELY_UNSET_VAR_42}").is_err());
    }
}
