//! Application configuration
//!
//! Host settings that are not part of any project: where logs go, how often
//! the terminal is redrawn, which spreadsheet extensions the wizard accepts.

use crate::dialogs::import_wizard::DEFAULT_EXTENSIONS;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Application configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Log directory (default: `<exe_dir>/Log`)
    pub log_dir: Option<PathBuf>,

    /// UI poll interval in milliseconds
    pub tick_rate_ms: u64,

    /// Extensions accepted as import sources, without the dot
    pub spreadsheet_extensions: Vec<String>,

    /// Ask before cancelling a running import
    pub confirm_cancel: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            tick_rate_ms: 50,
            spreadsheet_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            confirm_cancel: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config.normalized())
    }

    /// Write the commented sample configuration to `path`
    ///
    /// 已存在的文件只有在 `force` 时才会被覆盖。
    pub fn write_sample_config<P: AsRef<Path>>(path: P, force: bool) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::sample_config()).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), "Sample configuration written");

        Ok(())
    }

    /// Poll interval as a duration, never below 10ms
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(10))
    }

    /// Strip leading dots and blanks from extensions; fall back to defaults
    /// when nothing usable remains
    fn normalized(mut self) -> Self {
        self.spreadsheet_extensions = self
            .spreadsheet_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        if self.spreadsheet_extensions.is_empty() {
            self.spreadsheet_extensions = Self::default().spreadsheet_extensions;
        }
        self
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Sheet Import Configuration File
# This file uses TOML format (https://toml.io)

# Log directory (default: Log/ next to the executable)
# log_dir = "D:/Logs/sheet-import"

# UI poll interval in milliseconds
tick_rate_ms = 50

# File extensions accepted as import sources
spreadsheet_extensions = ["xls", "xlsx"]

# Ask for confirmation before cancelling a running import
confirm_cancel = true
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file '{}': {source}", .path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    #[error("Failed to write config file '{}': {source}", .path.display())]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Refused to overwrite an existing configuration file
    #[error("Config file '{}' already exists (use --force to overwrite)", .path.display())]
    AlreadyExists { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.tick_rate_ms, 50);
        assert_eq!(config.spreadsheet_extensions, vec!["xls", "xlsx"]);
        assert!(config.confirm_cancel);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_sample_config_parses() {
        let config: AppConfig = toml::from_str(&AppConfig::sample_config()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_write_sample_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Config").join("sheet-import.toml");

        AppConfig::write_sample_config(&path, false).unwrap();
        assert_eq!(AppConfig::load_from_file(&path).unwrap(), AppConfig::default());

        fs::write(&path, "tick_rate_ms = 200\n").unwrap();
        assert!(matches!(
            AppConfig::write_sample_config(&path, false),
            Err(ConfigError::AlreadyExists { .. })
        ));
        assert_eq!(AppConfig::load_from_file(&path).unwrap().tick_rate_ms, 200);

        AppConfig::write_sample_config(&path, true).unwrap();
        assert_eq!(AppConfig::load_from_file(&path).unwrap().tick_rate_ms, 50);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "confirm_cancel = false\nspreadsheet_extensions = [\".XLS\", \" \"]\n")
            .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert!(!config.confirm_cancel);
        assert_eq!(config.tick_rate_ms, 50);
        assert_eq!(config.spreadsheet_extensions, vec!["XLS"]);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = AppConfig::load_from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::ReadError { .. })));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "tick_rate_ms = \"fast\"").unwrap();
        assert!(matches!(
            AppConfig::load_from_file(&bad),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_tick_rate_floor() {
        let config = AppConfig {
            tick_rate_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.tick_rate(), Duration::from_millis(10));
    }
}
