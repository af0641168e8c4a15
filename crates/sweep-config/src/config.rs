//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Scanner tuning and request limits.
    pub scan: ScanConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Demo driver settings.
    pub demo: DemoConfig,
}

/// Scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Sub-box volume (in voxels) at or above which a packed section is
    /// decoded in bulk before walking it.
    pub predecode_threshold: u32,
    /// Largest radius accepted by `register`, on either axis.
    pub max_radius: u32,
    /// Bulk-decode only the index range a sub-box spans instead of the whole section.
    pub partial_unpack: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write a JSON log file next to the config in debug builds.
    pub log_to_file: bool,
}

/// Demo world generation and driver settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Seed for the world generator.
    pub seed: u64,
    /// Number of simulation steps to run.
    pub steps: u32,
    /// Loaded area half-width, in columns, around the origin.
    pub world_radius_columns: i32,
    /// Horizontal radius of the widest demo request.
    pub horizontal_radius: u32,
    /// Vertical radius of the widest demo request.
    pub vertical_radius: u32,
}

// --- Default implementations ---

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            predecode_threshold: 512,
            max_radius: 256,
            partial_unpack: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            steps: 5,
            world_radius_columns: 4,
            horizontal_radius: 24,
            vertical_radius: 32,
        }
    }
}

/// Default configuration directory (`<platform config dir>/sweep`), falling
/// back to `./config` when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("sweep"))
        .unwrap_or_else(|| PathBuf::from("config"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config = Self::from_ron(&contents)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Parse a config from RON text.
    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(ConfigError::ParseError)
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config = Self::from_ron(&contents)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("predecode_threshold: 512"));
        assert!(ron_str.contains("partial_unpack: true"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized = Config::from_ron(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let config = Config::from_ron("(scan: (max_radius: 64))").unwrap();
        assert_eq!(config.scan.max_radius, 64);
        assert_eq!(config.scan.predecode_threshold, 512);
        assert_eq!(config.demo, DemoConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        assert!(Config::from_ron("(future_setting: true)").is_ok());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result = Config::from_ron("{{not valid}}");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.scan.predecode_threshold = 1024;
        config.demo.seed = 7;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.scan.partial_unpack = false;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.scan.partial_unpack), Some(false));
    }
}
