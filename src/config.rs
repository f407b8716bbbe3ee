//! Configuration for lineterm.
//!
//! This module provides:
//! - The per-session configuration (`name`, `prompt`, `input_mode`)
//! - TOML configuration file loading from `~/.lineterm/config.toml`
//!
//! # Configuration File
//!
//! ```toml
//! # Prompt redraw debounce in milliseconds
//! debounce_ms = 100
//!
//! # Log level: error, warn, info, debug, trace
//! log_level = "info"
//!
//! # Demo host: write a background line every N seconds (0 = off)
//! tick_secs = 0
//!
//! [session]
//! name = "lineterm"
//! prompt = "> "
//! # raw, rawecho, cooked or disabled
//! input_mode = "cooked"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write config: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine config path")]
    NoHome,
}

/// How input chunks are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Forward every chunk unchanged
    Raw,
    /// Forward every chunk and echo it
    RawEcho,
    /// Local line editing
    #[default]
    Cooked,
    /// Ignore input
    Disabled,
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(InputMode::Raw),
            "rawecho" | "raw-echo" => Ok(InputMode::RawEcho),
            "cooked" => Ok(InputMode::Cooked),
            "disabled" => Ok(InputMode::Disabled),
            other => Err(format!("Unknown input mode: {}", other)),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Identity; cannot change after creation
    pub name: String,
    pub prompt: String,
    pub input_mode: InputMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "lineterm".to_string(),
            prompt: "> ".to_string(),
            input_mode: InputMode::Cooked,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prompt redraw debounce (ms)
    pub debounce_ms: u64,
    pub log_level: String,
    /// Background output interval for the demo host (s), 0 disables
    pub tick_secs: u64,
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            log_level: "info".to_string(),
            tick_secs: 0,
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `~/.lineterm/config.toml`, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::get_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to `~/.lineterm/config.toml`
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::get_config_path().ok_or(ConfigError::NoHome)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(ConfigError::Write)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Get config file path
    pub fn get_config_path() -> Option<PathBuf> {
        data_dir().map(|dir| dir.join("config.toml"))
    }
}

/// `~/.lineterm`, created on demand
pub fn data_dir() -> Option<PathBuf> {
    let dir = home_dir()?.join(".lineterm");
    if !dir.exists() {
        let _ = fs::create_dir_all(&dir);
    }
    Some(dir)
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r#"
            debounce_ms = 250
            log_level = "debug"

            [session]
            name = "build"
            prompt = "$ "
            input_mode = "rawecho"
            "#,
        )
        .unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.tick_secs, 0);
        assert_eq!(config.session.name, "build");
        assert_eq!(config.session.prompt, "$ ");
        assert_eq!(config.session.input_mode, InputMode::RawEcho);
    }

    #[test]
    fn test_parse_defaults() {
        let config = Config::parse("[session]\nprompt = \">>> \"\n").unwrap();
        assert_eq!(config.session.name, "lineterm");
        assert_eq!(config.session.prompt, ">>> ");
        assert_eq!(config.session.input_mode, InputMode::Cooked);
        assert_eq!(config.debounce_ms, 100);
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let err = Config::parse("[session]\ninput_mode = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_input_mode_from_str() {
        assert_eq!("RAW".parse::<InputMode>(), Ok(InputMode::Raw));
        assert_eq!("raw-echo".parse::<InputMode>(), Ok(InputMode::RawEcho));
        assert_eq!("disabled".parse::<InputMode>(), Ok(InputMode::Disabled));
        assert!("other".parse::<InputMode>().is_err());
    }

    #[test]
    fn test_save_to_and_load_from() {
        let path = std::env::temp_dir().join(format!("lineterm-config-{}.toml", std::process::id()));
        let mut config = Config::default();
        config.session.prompt = "% ".to_string();
        config.session.input_mode = InputMode::Raw;

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_to_missing_dir_fails() {
        let path = std::env::temp_dir()
            .join("lineterm-no-such-dir")
            .join("config.toml");
        let err = Config::default().save_to(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Write(_)));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("input_mode = \"cooked\""));
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
