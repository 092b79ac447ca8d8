//! User configuration (`config.toml`)
//!
//! Lives at `<config dir>/invest/config.toml`. Every field is optional and a
//! missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::db::{self, DB_PATH_ENV};
use crate::tax::DEFAULT_TAX_CATEGORIES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite event store location
    pub database_path: Option<PathBuf>,
    /// Categories whose realized gains go into the tax report
    pub tax_categories: Vec<String>,
    /// Index shown next to the year report
    pub benchmark_index: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            tax_categories: DEFAULT_TAX_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            benchmark_index: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dir_spec::config_home()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("invest").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid config {:?}", path))
    }

    /// Index names are stored uppercased, so the configured one is too
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.benchmark_index = config
            .benchmark_index
            .map(|index| index.trim().to_uppercase())
            .filter(|index| !index.is_empty());
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Database location: `--db`, then `$INVEST_DB`, then the config file,
    /// then the data directory.
    pub fn resolve_db_path(&self, cli_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = cli_override {
            return Ok(path);
        }
        let from_env = std::env::var(DB_PATH_ENV)
            .ok()
            .filter(|path| !path.trim().is_empty());
        if from_env.is_none() {
            if let Some(path) = &self.database_path {
                return Ok(path.clone());
            }
        }
        db::get_default_db_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("config.toml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.tax_categories, vec!["Stocks"]);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse("benchmark_index = \"IBOV\"\n").unwrap();
        assert_eq!(config.benchmark_index.as_deref(), Some("IBOV"));
        assert_eq!(config.tax_categories, vec!["Stocks"]);
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn test_full_file_round_trips() {
        let content = "database_path = \"/tmp/ledger.db\"\n\
                       tax_categories = [\"Ações\", \"FII\"]\n\
                       benchmark_index = \"IBOV\"\n";
        let config = Config::parse(content).unwrap();
        assert_eq!(config.tax_categories, vec!["Ações", "FII"]);
        assert_eq!(Config::parse(&config.to_toml().unwrap()).unwrap(), config);
    }

    #[test]
    fn test_benchmark_index_is_uppercased() {
        let config = Config::parse("benchmark_index = \" ibov \"\n").unwrap();
        assert_eq!(config.benchmark_index.as_deref(), Some("IBOV"));

        let config = Config::parse("benchmark_index = \"\"\n").unwrap();
        assert_eq!(config.benchmark_index, None);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        assert!(Config::parse("tax_categories = 3").is_err());
    }

    #[test]
    fn test_cli_db_path_wins() {
        let config = Config {
            database_path: Some(PathBuf::from("/from/config.db")),
            ..Config::default()
        };
        let path = config
            .resolve_db_path(Some(PathBuf::from("/from/cli.db")))
            .unwrap();
        assert_eq!(path, PathBuf::from("/from/cli.db"));
    }
}
