//! App Configuration
//!
//! Stored as `app_config.json` in the data directory and created with
//! defaults on first launch.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{DomainError, DomainResult};

pub const CONFIG_FILE: &str = "app_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database file name inside the data directory
    pub db_file: String,
    /// Base of shared links: `{share_base_url}/bowl/{id}`
    pub share_base_url: String,
    /// Attempts per read-modify-write before giving up on conflicts
    pub max_commit_attempts: u32,
    /// Log file prefix
    pub app_name: String,
    /// Where the database, config and logs live (not serialized)
    #[serde(skip)]
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_file: "chitti_udi.db".to_string(),
            share_base_url: "https://yourapp.com".to_string(),
            max_commit_attempts: 5,
            app_name: "ChittiUdi".to_string(),
            data_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Link to a bowl, without a trailing slash on the base
    pub fn share_url(&self, bowl_id: &str) -> String {
        format!("{}/bowl/{}", self.share_base_url.trim_end_matches('/'), bowl_id)
    }
}

/// Load the config from `data_dir`, writing defaults if the file is missing.
pub fn load_config(data_dir: &Path) -> DomainResult<AppConfig> {
    fs::create_dir_all(data_dir).map_err(DomainError::store)?;
    let path = data_dir.join(CONFIG_FILE);

    let mut config = if path.exists() {
        let raw = fs::read_to_string(&path).map_err(DomainError::store)?;
        serde_json::from_str::<AppConfig>(&raw)
            .map_err(|e| DomainError::InvalidInput(format!("{}: {}", path.display(), e)))?
    } else {
        let config = AppConfig::default();
        save_config_to(&path, &config)?;
        config
    };

    config.data_dir = data_dir.to_path_buf();
    if config.max_commit_attempts == 0 {
        config.max_commit_attempts = 1;
    }
    Ok(config)
}

/// Write the config back to its data directory.
pub fn save_config(config: &AppConfig) -> DomainResult<()> {
    save_config_to(&config.data_dir.join(CONFIG_FILE), config)
}

fn save_config_to(path: &Path, config: &AppConfig) -> DomainResult<()> {
    let json = serde_json::to_string_pretty(config).map_err(DomainError::store)?;
    fs::write(path, json).map_err(DomainError::store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_written_on_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();

        assert_eq!(config, AppConfig {
            data_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        });
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"share_base_url":"https://chitti.example/","max_commit_attempts":0}"#,
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.db_file, "chitti_udi.db");
        assert_eq!(config.max_commit_attempts, 1);
        assert_eq!(config.share_url("b1"), "https://chitti.example/bowl/b1");
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = load_config(dir.path()).unwrap();
        config.app_name = "Test".to_string();
        save_config(&config).unwrap();

        assert_eq!(load_config(dir.path()).unwrap().app_name, "Test");
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();
        assert!(matches!(load_config(dir.path()), Err(DomainError::InvalidInput(_))));
    }
}
