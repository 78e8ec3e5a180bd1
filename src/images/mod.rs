//! Card image cache.
//!
//! ## Key Types
//!
//! - `ImageCache`: content-addressable disk cache keyed by URL hash
//! - `ImageSource`: where misses are downloaded from (`HttpImageSource` by default)
//! - `PreloadReport`: outcome of a bulk `preload_all`

pub mod cache;
pub mod preload;
pub mod source;

pub use cache::{cache_key, CacheSource, CacheStats, CachedImage, ImageCache, CACHE_EXTENSION};
pub use preload::PreloadReport;
pub use source::{HttpImageSource, ImageSource};
