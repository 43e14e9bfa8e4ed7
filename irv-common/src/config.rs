//! Configuration loading and config file resolution
//!
//! Resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. `IRV_CONFIG` environment variable
//! 3. `<platform config dir>/incident-review/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A file named explicitly (levels 1 and 2) must exist and parse. A missing
//! file at the implicit platform location is not an error: defaults are used
//! and a warning is logged.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "IRV_CONFIG";

/// Default tracing filter level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Canonical seek time per known room, in seconds.
///
/// Used as the seek target when a room marker is clicked, independent of
/// which event currently owns the room. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomTimestampMap(BTreeMap<String, f64>);

impl RoomTimestampMap {
    pub fn new(entries: BTreeMap<String, f64>) -> Self {
        Self(entries)
    }

    /// Arrival times for the reference apartment floor plan
    pub fn default_apartment() -> Self {
        let entries = [
            ("entrance", 31.0),
            ("bathroom", 36.0),
            ("dining-room", 46.0),
            ("bedroom-1", 56.0),
            ("tv-room", 62.0),
            ("bedroom-2", 65.0),
            ("living-room", 94.0),
            ("bedroom-3", 95.0),
        ];
        Self(
            entries
                .into_iter()
                .map(|(room, secs)| (room.to_string(), secs))
                .collect(),
        )
    }

    /// Canonical seek time for a room, if the room is known
    pub fn get(&self, location: &str) -> Option<f64> {
        self.0.get(location).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn validate(&self) -> Result<()> {
        for (room, secs) in &self.0 {
            if !secs.is_finite() || *secs < 0.0 {
                return Err(Error::Config(format!(
                    "room_timestamps.{} must be a non-negative number of seconds, got {}",
                    room, secs
                )));
            }
        }
        Ok(())
    }
}

impl Default for RoomTimestampMap {
    fn default() -> Self {
        Self::default_apartment()
    }
}

/// One classifier keyword rule as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRuleConfig {
    /// Category name (`forced-entry`, `property-crime`, `all-clear`, `officer-generic`)
    pub category: String,
    /// Substrings matched case-insensitively against the event summary
    pub keywords: Vec<String>,
}

/// Raw TOML file contents. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub log_level: Option<String>,
    pub highlight_window_sec: Option<f64>,
    pub room_timestamps: Option<BTreeMap<String, f64>>,
    pub classifier_rules: Option<Vec<KeywordRuleConfig>>,
}

/// Resolved review configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewConfig {
    pub log_level: String,
    /// How long an event stays highlighted after its timestamp.
    /// `None` keeps it highlighted until the next event.
    pub highlight_window_sec: Option<f64>,
    pub room_timestamps: RoomTimestampMap,
    /// Replaces the built-in classifier rules when present
    pub classifier_rules: Option<Vec<KeywordRuleConfig>>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            highlight_window_sec: None,
            room_timestamps: RoomTimestampMap::default_apartment(),
            classifier_rules: None,
        }
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    PlatformDefault(PathBuf),
    CompiledDefaults,
}

impl ReviewConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: TomlConfig = toml::from_str(text)?;
        Self::from_toml(raw)
    }

    pub fn from_toml(raw: TomlConfig) -> Result<Self> {
        let defaults = Self::default();

        if let Some(window) = raw.highlight_window_sec {
            if !window.is_finite() || window <= 0.0 {
                return Err(Error::Config(format!(
                    "highlight_window_sec must be positive, got {}",
                    window
                )));
            }
        }

        let room_timestamps = match raw.room_timestamps {
            Some(entries) => RoomTimestampMap::new(entries),
            None => defaults.room_timestamps,
        };
        room_timestamps.validate()?;

        if let Some(rules) = &raw.classifier_rules {
            if let Some(rule) = rules.iter().find(|r| r.keywords.is_empty()) {
                return Err(Error::Config(format!(
                    "classifier rule for '{}' has no keywords",
                    rule.category
                )));
            }
        }

        Ok(Self {
            log_level: raw.log_level.unwrap_or(defaults.log_level),
            highlight_window_sec: raw.highlight_window_sec,
            room_timestamps,
            classifier_rules: raw.classifier_rules,
        })
    }

    /// Load a specific file. Missing or malformed files are errors.
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve and load the effective configuration
    pub fn load(cli_path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match resolve_config_source(cli_path) {
            ConfigSource::CompiledDefaults => {
                info!("No config file found, using compiled defaults");
                Ok((Self::default(), ConfigSource::CompiledDefaults))
            }
            ConfigSource::PlatformDefault(path) => match Self::load_file(&path) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    Ok((config, ConfigSource::PlatformDefault(path)))
                }
                Err(e) => {
                    warn!("Ignoring config at {}: {}", path.display(), e);
                    Ok((Self::default(), ConfigSource::CompiledDefaults))
                }
            },
            ConfigSource::CommandLine(path) => {
                let config = Self::load_file(&path)?;
                info!("Loaded config from {} (command line)", path.display());
                Ok((config, ConfigSource::CommandLine(path)))
            }
            ConfigSource::Environment(path) => {
                let config = Self::load_file(&path)?;
                info!("Loaded config from {} ({})", path.display(), CONFIG_ENV_VAR);
                Ok((config, ConfigSource::Environment(path)))
            }
        }
    }
}

/// Pick the config file to read, following the priority order
pub fn resolve_config_source(cli_path: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    if let Some(path) = platform_config_path() {
        if path.exists() {
            return ConfigSource::PlatformDefault(path);
        }
    }

    // Priority 4: Compiled defaults
    ConfigSource::CompiledDefaults
}

/// `~/.config/incident-review/config.toml` on Linux, the equivalent elsewhere
pub fn platform_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("incident-review").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_apartment_rooms() {
        let rooms = RoomTimestampMap::default_apartment();
        assert_eq!(rooms.len(), 8);
        assert_eq!(rooms.get("entrance"), Some(31.0));
        assert_eq!(rooms.get("bedroom-3"), Some(95.0));
        assert_eq!(rooms.get("garage"), None);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ReviewConfig::from_toml_str("").unwrap();
        assert_eq!(config, ReviewConfig::default());
    }

    #[test]
    fn test_room_table_replaces_defaults() {
        let config = ReviewConfig::from_toml_str(
            r#"
            [room_timestamps]
            kitchen = 12.5
            "#,
        )
        .unwrap();
        assert_eq!(config.room_timestamps.len(), 1);
        assert_eq!(config.room_timestamps.get("kitchen"), Some(12.5));
        assert_eq!(config.room_timestamps.get("entrance"), None);
    }

    #[test]
    fn test_negative_room_time_rejected() {
        let result = ReviewConfig::from_toml_str(
            r#"
            [room_timestamps]
            kitchen = -1.0
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_highlight_window_rejected() {
        let result = ReviewConfig::from_toml_str("highlight_window_sec = 0.0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_classifier_rules_parsed() {
        let config = ReviewConfig::from_toml_str(
            r#"
            [[classifier_rules]]
            category = "all-clear"
            keywords = ["code 4"]
            "#,
        )
        .unwrap();
        let rules = config.classifier_rules.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].category, "all-clear");
        assert_eq!(rules[0].keywords, vec!["code 4".to_string()]);
    }

    #[test]
    fn test_rule_without_keywords_rejected() {
        let result = ReviewConfig::from_toml_str(
            r#"
            [[classifier_rules]]
            category = "all-clear"
            keywords = []
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ReviewConfig::from_toml_str("colour = \"blue\"");
        assert!(matches!(result, Err(Error::Toml(_))));
    }
}
