//! Content-addressable image cache.
//!
//! Each image is stored as `<dir>/<sha256(url)>.jpg` holding the bytes exactly
//! as downloaded. Nothing else is persisted: an entry exists iff its file
//! exists.
//!
//! ## Read modes
//!
//! - `read_cached`: disk only, never touches the network.
//! - `fetch_and_cache`: disk first, download on a miss.
//!
//! A cached file that fails to decode is deleted and reported as a miss, so
//! the next `fetch_and_cache` or `preload` downloads it again.
//!
//! ## Concurrency
//!
//! Operations on one URL serialize on a lock keyed by the URL hash; distinct
//! URLs proceed in parallel. A lock entry lives only while some caller holds
//! or waits on it, and `clear` leaves the entries alone. Downloads are written to a temporary sibling and
//! renamed into place, so a partial body is never visible under the cache
//! name.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use image::DynamicImage;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::source::{HttpImageSource, ImageSource};
use crate::config::AppConfig;
use crate::error::{CacheError, CacheResult};

/// Extension of every cache file.
pub const CACHE_EXTENSION: &str = "jpg";

const PARTIAL_EXTENSION: &str = "part";

/// Where a returned image came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheSource {
    Disk,
    Network,
}

/// A decoded image and its cache location.
#[derive(Clone, Debug)]
pub struct CachedImage {
    /// Hex SHA-256 of the URL.
    pub key: String,
    pub path: PathBuf,
    /// Decoded (and possibly shrunk) image.
    pub image: DynamicImage,
    pub source: CacheSource,
}

/// Cache accounting from a directory scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub count: usize,
    pub total_bytes: u64,
    pub dir: PathBuf,
}

impl CacheStats {
    /// Total size in MiB, two decimals.
    #[must_use]
    pub fn size_mb(&self) -> f64 {
        let mb = self.total_bytes as f64 / (1024.0 * 1024.0);
        (mb * 100.0).round() / 100.0
    }
}

/// Cache key for a URL: lowercase hex SHA-256.
#[must_use]
pub fn cache_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

/// Disk-backed image cache.
pub struct ImageCache<S = HttpImageSource> {
    dir: PathBuf,
    source: S,
    locks: Mutex<FxHashMap<String, Arc<Mutex<()>>>>,
}

impl ImageCache<HttpImageSource> {
    /// Cache configured from `config.images`, downloading over HTTP.
    pub fn from_config(config: &AppConfig) -> CacheResult<Self> {
        let source = HttpImageSource::new(&config.api.user_agent)?;
        Ok(Self::with_source(config.images.cache_dir.clone(), source))
    }
}

impl<S: ImageSource> ImageCache<S> {
    /// Cache rooted at `dir` (created on first write) using `source` for misses.
    pub fn with_source(dir: impl Into<PathBuf>, source: S) -> Self {
        Self {
            dir: dir.into(),
            source,
            locks: Mutex::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Cache key for `url`.
    #[must_use]
    pub fn key_for(&self, url: &str) -> String {
        cache_key(url)
    }

    /// File a URL is (or would be) cached at.
    #[must_use]
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.path_for_key(&cache_key(url))
    }

    /// True if a file exists for `url` (it may still turn out corrupt).
    #[must_use]
    pub fn is_cached(&self, url: &str) -> bool {
        !url.is_empty() && self.path_for(url).is_file()
    }

    /// Read an image from disk only.
    ///
    /// `None` for an empty URL, a missing file, or a corrupt file (which is
    /// deleted). The image is shrunk to fit `target_size` if it is larger.
    pub fn read_cached(
        &self,
        url: &str,
        target_size: Option<(u32, u32)>,
    ) -> CacheResult<Option<DynamicImage>> {
        if url.is_empty() {
            return Ok(None);
        }

        let key = cache_key(url);
        let path = self.path_for_key(&key);
        let image = self.with_key_lock(&key, || self.load_from_disk(&path))?;
        Ok(image.map(|image| fit_within(image, target_size)))
    }

    /// Read from disk, downloading and storing the image on a miss.
    pub fn fetch_and_cache(
        &self,
        url: &str,
        target_size: Option<(u32, u32)>,
        timeout: Duration,
    ) -> CacheResult<CachedImage> {
        if url.is_empty() {
            return Err(CacheError::EmptyUrl);
        }

        let key = cache_key(url);
        let path = self.path_for_key(&key);
        let (image, source) =
            self.with_key_lock(&key, || self.load_or_download(url, &path, timeout))?;

        Ok(CachedImage {
            key,
            path,
            image: fit_within(image, target_size),
            source,
        })
    }

    /// Make sure a decodable copy of `url` is on disk without returning it.
    ///
    /// Returns `Disk` if a valid file already existed. A corrupt file is
    /// replaced and reported as `Network`.
    pub fn preload(&self, url: &str, timeout: Duration) -> CacheResult<CacheSource> {
        if url.is_empty() {
            return Err(CacheError::EmptyUrl);
        }

        let key = cache_key(url);
        let path = self.path_for_key(&key);
        let (_, source) =
            self.with_key_lock(&key, || self.load_or_download(url, &path, timeout))?;
        Ok(source)
    }

    /// Delete every cache file. Returns how many were removed.
    ///
    /// Per-key locks are left alone, so a download in flight finishes and
    /// writes its file after the scan.
    pub fn clear(&self) -> CacheResult<usize> {
        let mut removed = 0;
        for path in self.cache_files()? {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(CacheError::Io { path, source }),
            }
        }

        info!("Cleared {} cached images from {}", removed, self.dir.display());
        Ok(removed)
    }

    /// Count and total size of cache files.
    pub fn stats(&self) -> CacheResult<CacheStats> {
        let mut stats = CacheStats {
            count: 0,
            total_bytes: 0,
            dir: self.dir.clone(),
        };

        for path in self.cache_files()? {
            match fs::metadata(&path) {
                Ok(metadata) => {
                    stats.count += 1;
                    stats.total_bytes += metadata.len();
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(CacheError::Io { path, source }),
            }
        }
        Ok(stats)
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, CACHE_EXTENSION))
    }

    /// Number of keys with a lock currently held or awaited.
    #[must_use]
    pub fn active_keys(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Run `f` holding the lock for `key`.
    ///
    /// The lock entry is dropped afterwards unless another caller holds or
    /// awaits it. Entries are only cloned and counted under the map lock.
    fn with_key_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.to_string()).or_default())
        };

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if locks.get(key).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(key);
        }
        result
    }

    /// Disk first, download on a miss. Caller holds the key lock.
    fn load_or_download(
        &self,
        url: &str,
        path: &Path,
        timeout: Duration,
    ) -> CacheResult<(DynamicImage, CacheSource)> {
        match self.load_from_disk(path)? {
            Some(image) => Ok((image, CacheSource::Disk)),
            None => Ok((self.download(url, path, timeout)?, CacheSource::Network)),
        }
    }

    /// Decode the file at `path`; delete it and report a miss if corrupt.
    fn load_from_disk(&self, path: &Path) -> CacheResult<Option<DynamicImage>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        match image::load_from_memory(&bytes) {
            Ok(image) => {
                debug!("Cache hit {}", path.display());
                Ok(Some(image))
            }
            Err(err) => {
                warn!("Discarding corrupt cached image {}: {}", path.display(), err);
                if let Err(err) = fs::remove_file(path) {
                    if err.kind() != ErrorKind::NotFound {
                        warn!("Failed to delete {}: {}", path.display(), err);
                    }
                }
                Ok(None)
            }
        }
    }

    /// Download, decode, then store. Nothing is written if either step fails.
    fn download(&self, url: &str, path: &Path, timeout: Duration) -> CacheResult<DynamicImage> {
        debug!("Cache miss for {}", url);
        let bytes = self.source.fetch(url, timeout)?;
        let image = image::load_from_memory(&bytes)?;
        self.write_entry(path, &bytes)?;
        Ok(image)
    }

    fn write_entry(&self, path: &Path, bytes: &[u8]) -> CacheResult<()> {
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| CacheError::Io { path, source }
        };

        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let partial = path.with_extension(PARTIAL_EXTENSION);
        if let Err(err) = fs::write(&partial, bytes) {
            let _ = fs::remove_file(&partial);
            return Err(io_error(&partial)(err));
        }
        fs::rename(&partial, path).map_err(io_error(path))
    }

    /// Every `*.jpg` file directly under the cache directory.
    fn cache_files(&self) -> CacheResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        Ok(entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(CACHE_EXTENSION)
            })
            .collect())
    }
}

/// Shrink `image` to fit inside `target_size`, keeping its aspect ratio.
/// Images that already fit are returned unchanged.
fn fit_within(image: DynamicImage, target_size: Option<(u32, u32)>) -> DynamicImage {
    match target_size {
        Some((width, height)) if image.width() > width || image.height() > height => {
            image.thumbnail(width, height)
        }
        _ => image,
    }
}
