//! # deckvault
//!
//! Collection, deck and card-image management for Magic: The Gathering.
//!
//! ## Design Principles
//!
//! 1. **Not-found is a value**: Lookups answer `Option`/`bool`; only I/O and
//!    malformed data are errors.
//!
//! 2. **Validate, then mutate**: A deck operation that fails leaves the deck
//!    untouched.
//!
//! 3. **Explicit configuration**: `AppConfig` is built once and handed to the
//!    constructors that need it.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: `CardIndex` uses `im-rs` so snapshots are
//!   O(1) and reconciliation can run against a stable view.
//!
//! - **Content-Addressable Cache**: Card images are stored under the SHA-256
//!   of their URL, written atomically, and self-heal when corrupt.
//!
//! ## Modules
//!
//! - `cards`: Card records, collection loading, index and queries
//! - `deck`: Deck aggregate, text import/export, JSON store
//! - `rules`: Reconciliation against the collection, format legality
//! - `images`: Image cache and bulk preloading
//! - `scryfall`: Card metadata API client
//! - `config`: TOML configuration
//! - `error`: Error types per layer

pub mod cards;
pub mod config;
pub mod deck;
pub mod error;
pub mod images;
pub mod rules;
pub mod scryfall;

// Re-export commonly used types
pub use crate::cards::{
    load_collection, CardIndex, CardQuery, CardRecord, CollectionLoad, CollectionStats,
};

pub use crate::config::{ApiConfig, AppConfig, DataConfig, ImageConfig};

pub use crate::deck::{
    export_deck_text, import_deck_text, import_edhrec_csv, DeckAggregate, DeckAnalysis,
    DeckEntry, DeckImport, DeckStore, DeckSummary, RemoveQuantity,
};

pub use crate::error::{
    CacheError, CollectionError, ConfigError, DeckError, ImportError, StoreError,
};

pub use crate::images::{
    CacheSource, CacheStats, CachedImage, HttpImageSource, ImageCache, ImageSource,
    PreloadReport,
};

pub use crate::rules::{
    Availability, EntryStatus, FormatValidator, ReconciliationEngine, ReconciliationResult,
    ValidationReport,
};

pub use crate::scryfall::{CardMetadataSource, ImageSize, ScryfallCard, ScryfallClient};
