use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

/// Player configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub default_volume: f32,
    /// Where `export` writes the track list when no path is given
    pub export_path: PathBuf,
    /// Directory imported by `add` when no path is given
    pub initial_directory: Option<PathBuf>,
    /// File extensions accepted on import, lowercase without the dot
    pub supported_extensions: Vec<String>,
    /// Read titles from tags instead of file names
    pub prefer_tag_titles: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: 0.8,
            export_path: PathBuf::from("trackList.csv"),
            initial_directory: dirs::audio_dir(),
            supported_extensions: ["mp3", "flac", "wav", "ogg", "m4a"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            prefer_tag_titles: false,
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config: PlayerConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        let config = match Self::load_config(&config_path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring unreadable configuration {}: {}", config_path.display(), e);
                PlayerConfig::default()
            }
        };

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Manager bound to an explicit file; the file is read if it exists
    pub fn with_path(config_path: PathBuf) -> Result<Self, ConfigError> {
        let config = Self::load_config(&config_path)?;
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn get_config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<(), ConfigError> {
        self.config.default_volume = volume.clamp(0.0, 1.0);
        self.save_config()
    }

    /// `<platform config dir>/titletree/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::ConfigDirNotFound)?
            .join("titletree");

        Ok(config_dir.join("config.toml"))
    }

    fn load_config(path: &Path) -> Result<PlayerConfig, ConfigError> {
        if !path.exists() {
            return Ok(PlayerConfig::default());
        }

        let config_content = std::fs::read_to_string(path)?;
        let config: PlayerConfig = toml::from_str(&config_content)?;

        Ok(config)
    }

    fn save_config(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let config_content = toml::to_string_pretty(&self.config)?;
        std::fs::write(&self.config_path, config_content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config_manager = ConfigManager {
            config: PlayerConfig::default(),
            config_path,
        };

        (config_manager, temp_dir)
    }

    #[test]
    fn test_player_config_default() {
        let config = PlayerConfig::default();

        assert_eq!(config.default_volume, 0.8);
        assert_eq!(config.export_path, PathBuf::from("trackList.csv"));
        assert!(!config.prefer_tag_titles);
        assert!(config.supported_extensions.contains(&"mp3".to_string()));
    }

    #[test]
    fn test_config_serialization() {
        let config = PlayerConfig {
            default_volume: 0.5,
            export_path: PathBuf::from("/tmp/tracks.csv"),
            initial_directory: Some(PathBuf::from("/music")),
            supported_extensions: vec!["mp3".to_string()],
            prefer_tag_titles: true,
        };

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: PlayerConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.default_volume, deserialized.default_volume);
        assert_eq!(config.export_path, deserialized.export_path);
        assert_eq!(config.initial_directory, deserialized.initial_directory);
        assert_eq!(config.supported_extensions, deserialized.supported_extensions);
        assert_eq!(config.prefer_tag_titles, deserialized.prefer_tag_titles);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PlayerConfig = toml::from_str("default_volume = 0.25\n").unwrap();
        assert_eq!(config.default_volume, 0.25);
        assert_eq!(config.export_path, PathBuf::from("trackList.csv"));
        assert_eq!(config.supported_extensions, PlayerConfig::default().supported_extensions);
    }

    #[test]
    fn test_save_and_load_config() {
        let (mut config_manager, _temp_dir) = create_test_config_manager();

        config_manager.config.default_volume = 0.6;
        config_manager.config.export_path = PathBuf::from("out.csv");
        config_manager.save_config().unwrap();

        let loaded_config = ConfigManager::load_config(&config_manager.config_path).unwrap();

        assert_eq!(loaded_config.default_volume, 0.6);
        assert_eq!(loaded_config.export_path, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().unwrap();
        let nonexistent_path = temp_dir.path().join("nonexistent.toml");

        let config = ConfigManager::load_config(&nonexistent_path).unwrap();

        assert_eq!(config.default_volume, PlayerConfig::default().default_volume);
    }

    #[test]
    fn test_load_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");

        fs::write(&config_path, "invalid toml content [[[").unwrap();

        let result = ConfigManager::load_config(&config_path);
        match result {
            Err(ConfigError::DeserializationError(_)) => {}
            other => panic!("Expected DeserializationError, got {:?}", other.map(|_| ())),
        }

        assert!(ConfigManager::with_path(config_path).is_err());
    }

    #[test]
    fn test_set_volume_clamps() {
        let (mut config_manager, _temp_dir) = create_test_config_manager();

        config_manager.set_volume(0.7).unwrap();
        assert_eq!(config_manager.config.default_volume, 0.7);

        config_manager.set_volume(1.5).unwrap();
        assert_eq!(config_manager.config.default_volume, 1.0);

        config_manager.set_volume(-0.5).unwrap();
        assert_eq!(config_manager.config.default_volume, 0.0);
    }

    #[test]
    fn test_set_volume_persists() {
        let (mut config_manager, _temp_dir) = create_test_config_manager();

        config_manager.set_volume(0.35).unwrap();

        let reloaded = ConfigManager::with_path(config_manager.config_path().to_path_buf()).unwrap();
        assert_eq!(reloaded.get_config().default_volume, 0.35);
        assert_eq!(reloaded.get_config().export_path, PathBuf::from("trackList.csv"));
    }

    #[test]
    fn test_default_config_path_uses_platform_config_dir() {
        match dirs::config_dir() {
            Some(base) => {
                let path = ConfigManager::default_config_path().unwrap();
                assert_eq!(path, base.join("titletree").join("config.toml"));
            }
            None => assert!(matches!(
                ConfigManager::default_config_path(),
                Err(ConfigError::ConfigDirNotFound)
            )),
        }
    }

    #[test]
    fn test_config_path_creation() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("nested").join("config").join("config.toml");

        let config_manager = ConfigManager {
            config: PlayerConfig::default(),
            config_path: nested_path.clone(),
        };

        config_manager.save_config().unwrap();

        assert!(nested_path.exists());
    }
}
