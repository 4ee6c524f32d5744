//! Configuration management for SnapCam
//!
//! Capture profiles, display policy, compression budget and storage
//! preferences, loaded from and saved to TOML.

use crate::errors::CameraError;
use crate::types::FacingMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapCamConfig {
    pub stream: StreamConfig,
    pub display: DisplayConfig,
    pub compression: CompressionConfig,
    pub storage: StorageConfig,
}

/// Stream request profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Ideal resolution on desktop platforms [width, height]
    pub desktop_resolution: [u32; 2],
    /// Ideal resolution on phones and tablets [width, height]
    pub mobile_resolution: [u32; 2],
    /// Facing hint sent on phones and tablets
    pub mobile_facing_mode: FacingMode,
}

/// On-screen sizing policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Fraction of the viewport height available to previews and results (0.0-1.0]
    pub viewport_height_fraction: f64,
}

/// Photo compression policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    /// Size budget for photos in bytes
    pub max_bytes: usize,
    /// First re-encode quality (1-100)
    pub first_quality: u8,
    /// Second and last re-encode quality (1-100)
    pub second_quality: u8,
    /// Downscale to the display geometry before re-encoding
    pub resize_to_viewport: bool,
    /// Quality used when a photo is synthesized from the live preview
    pub snapshot_quality: u8,
}

/// Storage and file management configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Default output directory for saved captures
    pub output_directory: String,
    /// Filename prefix for saved captures
    pub file_prefix: String,
}

impl Default for SnapCamConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig {
                desktop_resolution: [1920, 1080],
                mobile_resolution: [1280, 720],
                mobile_facing_mode: FacingMode::User,
            },
            display: DisplayConfig {
                viewport_height_fraction: 0.6,
            },
            compression: CompressionConfig {
                enabled: true,
                max_bytes: 2 * 1024 * 1024,
                first_quality: 80,
                second_quality: 70,
                resize_to_viewport: true,
                snapshot_quality: 92,
            },
            storage: StorageConfig {
                output_directory: "./captures".to_string(),
                file_prefix: "snapcam".to_string(),
            },
        }
    }
}

impl SnapCamConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| CameraError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: SnapCamConfig = toml::from_str(&contents)
            .map_err(|e| CameraError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate().map_err(CameraError::ConfigError)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CameraError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| CameraError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| CameraError::ConfigError(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("snapcam.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        let [dw, dh] = self.stream.desktop_resolution;
        let [mw, mh] = self.stream.mobile_resolution;
        if dw == 0 || dh == 0 || mw == 0 || mh == 0 {
            return Err("Invalid stream resolution".to_string());
        }

        let fraction = self.display.viewport_height_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err("Viewport height fraction must be in (0.0, 1.0]".to_string());
        }

        let c = &self.compression;
        if c.max_bytes == 0 {
            return Err("Compression budget must be positive".to_string());
        }
        for quality in [c.first_quality, c.second_quality, c.snapshot_quality] {
            if quality == 0 || quality > 100 {
                return Err("JPEG quality must be between 1 and 100".to_string());
            }
        }
        if c.second_quality > c.first_quality {
            return Err("Second compression quality must not exceed the first".to_string());
        }

        if self.storage.output_directory.is_empty() {
            return Err("Output directory must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SnapCamConfig::default();
        assert_eq!(config.stream.desktop_resolution, [1920, 1080]);
        assert_eq!(config.stream.mobile_resolution, [1280, 720]);
        assert_eq!(config.compression.max_bytes, 2 * 1024 * 1024);
        assert!(config.compression.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad = SnapCamConfig::default();
        bad.stream.desktop_resolution = [0, 1080];
        assert!(bad.validate().is_err());

        let mut bad = SnapCamConfig::default();
        bad.display.viewport_height_fraction = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = SnapCamConfig::default();
        bad.compression.first_quality = 60;
        assert!(bad.validate().is_err());

        let mut bad = SnapCamConfig::default();
        bad.compression.snapshot_quality = 101;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested").join("snapcam.toml");

        let mut config = SnapCamConfig::default();
        config.display.viewport_height_fraction = 1.0;
        config.compression.enabled = false;
        config.save_to_file(&config_path).unwrap();

        let loaded = SnapCamConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_toml_format() {
        let toml_string = toml::to_string_pretty(&SnapCamConfig::default()).unwrap();
        assert!(toml_string.contains("[stream]"));
        assert!(toml_string.contains("[display]"));
        assert!(toml_string.contains("[compression]"));
        assert!(toml_string.contains("[storage]"));
        assert!(toml_string.contains("mobile_facing_mode = \"user\""));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        let mut config = SnapCamConfig::default();
        config.compression.max_bytes = 0;
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let result = SnapCamConfig::load_from_file(&path);
        assert!(matches!(result, Err(CameraError::ConfigError(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SnapCamConfig::load_from_file("nonexistent_snapcam.toml");
        assert_eq!(result.unwrap(), SnapCamConfig::default());
    }
}
