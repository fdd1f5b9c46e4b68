//! User configuration.
//!
//! Loaded from `<config dir>/gunluk/config.toml`. Every key is optional and a
//! missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::app::series::EpisodeBoundary;
use crate::paths::database_file_path;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// SQLite file; defaults to the platform data directory.
    pub database: Option<PathBuf>,
    /// Where a "same season" range starts: `next` or `overlap`.
    pub episode_boundary: EpisodeBoundary,
    pub retry_attempts: usize,
    pub retry_delay_ms: u64,
    /// Rows shown by `recent` and after writes.
    pub recent_limit: usize,
    /// Before this local hour, new entries may be dated yesterday.
    pub late_night_cutoff_hour: u32,
    /// Default `tracing` filter when `GUNLUK_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            episode_boundary: EpisodeBoundary::default(),
            retry_attempts: 3,
            retry_delay_ms: 500,
            recent_limit: 10,
            late_night_cutoff_hour: 4,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config at {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        if config.late_night_cutoff_hour > 23 {
            anyhow::bail!(
                "late-night-cutoff-hour must be between 0 and 23, got {}",
                config.late_night_cutoff_hour
            );
        }
        Ok(config)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => database_file_path(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse("").expect("empty config should parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.episode_boundary, EpisodeBoundary::Next);
    }

    #[test]
    fn reads_kebab_case_keys() {
        let config = Config::parse(
            r#"
            database = "/tmp/journal.db"
            episode-boundary = "overlap"
            retry-attempts = 5
            retry-delay-ms = 20
            recent-limit = 3
            late-night-cutoff-hour = 2
            log-level = "debug"
            "#,
        )
        .expect("config should parse");
        assert_eq!(config.database, Some(PathBuf::from("/tmp/journal.db")));
        assert_eq!(config.episode_boundary, EpisodeBoundary::Overlap);
        assert_eq!(
            config.retry_policy(),
            RetryPolicy {
                attempts: 5,
                delay: Duration::from_millis(20),
            }
        );
        assert_eq!(config.recent_limit, 3);
        assert_eq!(config.late_night_cutoff_hour, 2);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(Config::parse("episode-boundary = \"both\"").is_err());
        assert!(Config::parse("retry_attempts = 2").is_err());
        assert!(Config::parse("late-night-cutoff-hour = 24").is_err());
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(&dir.path().join("config.toml")).expect("defaults");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "recent-limit = 25\n").expect("write config");
        let config = Config::load(&path).expect("config should load");
        assert_eq!(config.recent_limit, 25);
        assert_eq!(config.retry_attempts, 3);
    }
}
