// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings that belong to the user rather than a project (recently opened
//! project, log verbosity, theme) live in a JSON file in the platform config
//! directory. Project settings are stored in the project database instead.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current configuration file format version.
pub const CONFIG_VERSION: u32 = 1;

const CONFIG_DIR: &str = "labeltool";
const CONFIG_FILE: &str = "config.json";

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter string understood by `env_logger`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,

    /// Project opened last, reopened on start
    #[serde(default)]
    pub recent_project: Option<PathBuf>,

    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default = "default_dark_theme")]
    pub dark_theme: bool,
}

fn default_dark_theme() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            recent_project: None,
            log_level: LogLevel::default(),
            dark_theme: default_dark_theme(),
        }
    }
}

impl AppConfig {
    /// Location of the config file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the config, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load() -> Self {
        Self::default_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str::<AppConfig>(&text) {
            Ok(config) if config.version == CONFIG_VERSION => config,
            Ok(config) => {
                // Logging is not up yet when the config is first read.
                eprintln!(
                    "Ignoring config version {} (expected {})",
                    config.version, CONFIG_VERSION
                );
                Self::default()
            }
            Err(e) => {
                eprintln!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = AppConfig {
            recent_project: Some(PathBuf::from("/tmp/project1")),
            log_level: LogLevel::Debug,
            ..AppConfig::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path), config);
    }

    #[test]
    fn test_missing_or_malformed_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"version": 1}"#).unwrap();
        assert!(config.dark_theme);
        assert_eq!(config.log_level, LogLevel::Info);
    }
}
