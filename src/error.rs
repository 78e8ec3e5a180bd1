//! Error types for every fallible layer of the crate.
//!
//! Each layer gets its own `thiserror` enum so callers can tell
//! "not found" (an `Option`/`bool` return, never an error) apart from
//! I/O failures and malformed data.
//!
//! | Layer | Error |
//! |---|---|
//! | Collection file loading | [`CollectionError`] |
//! | Deck mutation | [`DeckError`] |
//! | Deck export import | [`ImportError`] |
//! | Deck persistence | [`StoreError`] |
//! | Image cache | [`CacheError`] |
//! | Configuration | [`ConfigError`] |

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the collection file.
///
/// Individual malformed rows are not errors; they are skipped and counted.
#[derive(Error, Debug)]
pub enum CollectionError {
    /// The collection file does not exist.
    #[error("collection file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read collection file: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be parsed at all (e.g. unreadable header).
    #[error("malformed collection file: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised by deck mutations.
///
/// A failed mutation never leaves the deck partially updated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeckError {
    /// Quantities added to a deck must be at least 1.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// The deck total would exceed `u32::MAX` copies.
    #[error("deck cannot hold more than 4294967295 cards")]
    QuantityOverflow,

    /// The card name could not be resolved through the collection index.
    #[error("card not found: {0}")]
    CardNotFound(String),
}

/// Errors raised while importing a deck export file.
#[derive(Error, Debug)]
pub enum ImportError {
    /// No header matched a card-name column.
    #[error("no card name column (expected Card, Name or Card Name; found {})", .found.join(", "))]
    MissingNameColumn { found: Vec<String> },

    /// The file could not be read or is not valid CSV.
    #[error("malformed deck export: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised by the on-disk deck store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("deck store I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A deck file exists but does not hold a valid deck.
    #[error("malformed deck file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize deck: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised by the image cache.
///
/// A missing or corrupt cache file is not an error: reads report it as a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No URL was supplied.
    #[error("empty image URL")]
    EmptyUrl,

    /// Reading, writing or scanning the cache directory failed.
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("download of {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The downloaded bytes are not a decodable image.
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// Errors raised while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Convenience alias for collection loading results.
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Convenience alias for deck mutation results.
pub type DeckResult<T> = Result<T, DeckError>;

/// Convenience alias for deck export import results.
pub type ImportResult<T> = Result<T, ImportError>;

/// Convenience alias for deck store results.
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenience alias for image cache results.
pub type CacheResult<T> = Result<T, CacheError>;
