//! Application configuration.
//!
//! A single [`AppConfig`] value is built once at startup (from a TOML file or
//! from defaults) and handed to each component's constructor. Nothing reads
//! configuration from global state.
//!
//! ```toml
//! [data]
//! collection_file = "data/cartas.csv"
//! decks_dir = "data/decks"
//!
//! [images]
//! cache_dir = "data/cache/images"
//! timeout_secs = 30
//!
//! [api]
//! rate_limit_ms = 100
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Collection and deck locations.
    pub data: DataConfig,
    /// Image cache settings.
    pub images: ImageConfig,
    /// Card metadata API settings.
    pub api: ApiConfig,
}

/// Where the collection file and saved decks live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Semicolon-delimited collection file.
    pub collection_file: PathBuf,
    /// Directory holding one JSON file per deck.
    pub decks_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            collection_file: PathBuf::from("data/cartas.csv"),
            decks_dir: PathBuf::from("data/decks"),
        }
    }
}

/// Image cache settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Cache directory (created on first write).
    pub cache_dir: PathBuf,

    /// Network timeout for a single image download, in seconds.
    pub timeout_secs: u64,

    /// Bounding box for list thumbnails (width, height).
    pub thumbnail_size: (u32, u32),

    /// Bounding box for the detail view (width, height).
    pub full_size: (u32, u32),

    /// Worker threads used when preloading many images.
    pub preload_workers: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/cache/images"),
            timeout_secs: 30,
            thumbnail_size: (200, 280),
            full_size: (488, 680),
            preload_workers: 4,
        }
    }
}

impl ImageConfig {
    /// Download timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Card metadata API settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Minimum delay between two consecutive requests, in milliseconds.
    pub rate_limit_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.scryfall.com".to_string(),
            user_agent: concat!("deckvault/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            rate_limit_ms: 100,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Minimum spacing between requests as a `Duration`.
    #[must_use]
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text. Absent keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Override the collection file location.
    #[must_use]
    pub fn with_collection_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data.collection_file = path.into();
        self
    }

    /// Override the decks directory.
    #[must_use]
    pub fn with_decks_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data.decks_dir = path.into();
        self
    }

    /// Override the image cache directory.
    #[must_use]
    pub fn with_cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.images.cache_dir = path.into();
        self
    }
}
