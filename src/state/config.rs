/// Gallery configuration
///
/// Grid spacing, breakpoints and the defaults handed to every loader.
/// Stored as JSON in the user's config directory:
/// - Linux: ~/.config/folio-gallery/config.json
/// - macOS: ~/Library/Application Support/folio-gallery/config.json
/// - Windows: %APPDATA%\folio-gallery\config.json

use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::state::load::{DEFAULT_QUALITY, DEFAULT_SIZES};

/// Viewport widths at which the grid gains columns
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Breakpoints {
    /// Simple: 3 columns, Highlight: 12-column mosaic
    pub medium: f32,
    /// Simple: 4 columns
    pub large: f32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            medium: 768.0,
            large: 1024.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    /// Space between cells in pixels
    pub gap: f32,
    /// Space around the grid inside the scroll area
    pub padding: f32,
    pub breakpoints: Breakpoints,
    /// Encode quality for every loader
    pub quality: u8,
    /// Responsive width descriptor for every loader
    pub sizes: String,
    /// Keep optimized images in the cache directory
    pub optimizer_cache: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            gap: 8.0,
            padding: 24.0,
            breakpoints: Breakpoints::default(),
            quality: DEFAULT_QUALITY,
            sizes: DEFAULT_SIZES.to_string(),
            optimizer_cache: true,
        }
    }
}

impl GalleryConfig {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let config = Self::from_json(&json)?;
                info!("⚙️  Loaded config from {}", path.display());
                Ok(config)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("⚙️  No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Directory holding `config.json` and the default `content.json`
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("folio-gallery");
            path
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Where optimized images are cached, if caching is enabled
    pub fn cache_dir(&self) -> Option<PathBuf> {
        if !self.optimizer_cache {
            return None;
        }
        dirs::cache_dir().map(|mut path| {
            path.push("folio-gallery");
            path.push("optimized");
            path
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GalleryConfig::from_json(r#"{ "gap": 12, "breakpoints": { "large": 1280 } }"#).unwrap();

        assert_eq!(config.gap, 12.0);
        assert_eq!(config.breakpoints.medium, 768.0);
        assert_eq!(config.breakpoints.large, 1280.0);
        assert_eq!(config.quality, DEFAULT_QUALITY);
        assert_eq!(config.sizes, DEFAULT_SIZES);
    }

    #[test]
    fn test_serialization() {
        let mut config = GalleryConfig::default();
        config.quality = 70;
        config.optimizer_cache = false;

        let json = config.to_json().unwrap();
        let restored = GalleryConfig::from_json(&json).unwrap();

        assert_eq!(config, restored);
        assert!(restored.cache_dir().is_none());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = GalleryConfig::load(Path::new("/nonexistent/folio/config.json")).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }
}
