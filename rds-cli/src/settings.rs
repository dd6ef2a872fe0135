//! Persistent monitor settings

use std::io;
use std::path::{Path, PathBuf};

use rds_monitor::{Completion, MonitorConfig, DEFAULT_RETRY_MS, DEFAULT_SETTLE_MS, DEFAULT_TIMEOUT_MS};
use rds_protocol::{GroupMask, PtyTable};
use rds_sim::StationConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Errors writing the settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Neither XDG_CONFIG_HOME nor a home directory is available
    #[error("could not determine settings path")]
    NoPath,

    /// Settings could not be encoded
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Settings file or directory could not be written
    #[error("failed to write settings: {0}")]
    Io(#[from] io::Error),
}

/// Monitor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Time budget per session in milliseconds; null runs until complete
    #[serde(default = "default_timeout")]
    pub timeout_ms: Option<u64>,
    /// Group types shown in reports and logs
    #[serde(default = "default_groups")]
    pub groups: Vec<u8>,
    /// When a session counts as complete
    #[serde(default)]
    pub completion: Completion,
    /// Wait after a received group (ms)
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
    /// Wait after an empty poll (ms)
    #[serde(default = "default_retry")]
    pub retry_ms: u64,
    /// Drop groups with uncorrectable blocks
    #[serde(default)]
    pub skip_uncorrectable: bool,
    /// Actually sleep between polls
    #[serde(default)]
    pub realtime: bool,
    /// PTY code table used for names
    #[serde(default)]
    pub pty_table: PtyTable,
    /// Station played by `simulate` when no station file is given
    #[serde(default)]
    pub station: StationConfig,
}

fn default_timeout() -> Option<u64> {
    Some(DEFAULT_TIMEOUT_MS)
}

fn default_groups() -> Vec<u8> {
    (0..16).collect()
}

fn default_settle() -> u64 {
    DEFAULT_SETTLE_MS
}

fn default_retry() -> u64 {
    DEFAULT_RETRY_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout(),
            groups: default_groups(),
            completion: Completion::default(),
            settle_ms: DEFAULT_SETTLE_MS,
            retry_ms: DEFAULT_RETRY_MS,
            skip_uncorrectable: false,
            realtime: false,
            pty_table: PtyTable::default(),
            station: StationConfig::default(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for rdsmon
    /// Uses $XDG_CONFIG_HOME/rdsmon, falls back to ~/.config/rdsmon
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("rdsmon"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("rdsmon"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::settings_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from a file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        let Ok(text) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %path.display(), "ignoring unreadable settings: {}", e);
            Self::default()
        })
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoPath)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to a file, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Group filter built from the group list
    pub fn group_filter(&self) -> GroupMask {
        let mut mask = GroupMask::EMPTY;
        for &group_type in self.groups.iter().filter(|&&g| g < 16) {
            mask.insert(group_type);
        }
        mask
    }

    /// Monitor configuration for a session
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            timeout_ms: self.timeout_ms,
            group_filter: self.group_filter(),
            completion: self.completion,
            settle_ms: self.settle_ms,
            retry_ms: self.retry_ms,
            skip_uncorrectable: self.skip_uncorrectable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("rdsmon-test-{}-{}", std::process::id(), name))
            .join("settings.json")
    }

    #[test]
    fn test_defaults_match_monitor() {
        let config = Settings::default().monitor_config();
        assert_eq!(config.timeout_ms, Some(DEFAULT_TIMEOUT_MS));
        assert_eq!(config.group_filter, GroupMask::ALL);
        assert_eq!(config.completion, Completion::ProgramServiceAndRadiotext);
    }

    #[test]
    fn test_save_and_load() {
        let path = scratch_path("roundtrip");
        let settings = Settings {
            timeout_ms: None,
            groups: vec![0, 2],
            completion: Completion::ProgramService,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.group_filter(), GroupMask(0x0005));

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = scratch_path("partial");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "groups": [4, 99] }"#).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.timeout_ms, Some(DEFAULT_TIMEOUT_MS));
        assert_eq!(loaded.group_filter(), GroupMask::of(4));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_unreadable_file_falls_back() {
        let path = scratch_path("garbage");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(Settings::load_from(&scratch_path("missing")), Settings::default());
    }
}
