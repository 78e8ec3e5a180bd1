//! Bulk preloading with a bounded worker pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use super::cache::{CacheSource, ImageCache};
use super::source::ImageSource;

/// Per-URL outcome counts for one `preload_all` run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// URLs already on disk.
    pub already_cached: usize,
    /// URLs downloaded by this run.
    pub fetched: usize,
    /// `(url, error)` for every URL that could not be cached.
    pub failed: Vec<(String, String)>,
}

impl PreloadReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.already_cached + self.fetched + self.failed.len()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<S: ImageSource> ImageCache<S> {
    /// Preload every URL using up to `workers` threads.
    ///
    /// Duplicate URLs are each counted; the per-key lock guarantees only the
    /// first of them downloads.
    pub fn preload_all(&self, urls: &[String], timeout: Duration, workers: usize) -> PreloadReport {
        let next = AtomicUsize::new(0);
        let report = Mutex::new(PreloadReport::default());
        let workers = workers.clamp(1, urls.len().max(1));

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(url) = urls.get(index) else {
                        break;
                    };

                    let outcome = self.preload(url, timeout);
                    let mut report = report
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    match outcome {
                        Ok(CacheSource::Disk) => report.already_cached += 1,
                        Ok(CacheSource::Network) => report.fetched += 1,
                        Err(err) => {
                            warn!("Failed to preload {}: {}", url, err);
                            report.failed.push((url.clone(), err.to_string()));
                        }
                    }
                });
            }
        });

        let report = report
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        info!(
            "Preloaded {} images: {} cached, {} fetched, {} failed",
            report.total(),
            report.already_cached,
            report.fetched,
            report.failed.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_totals() {
        let report = PreloadReport {
            already_cached: 2,
            fetched: 1,
            failed: vec![("u".to_string(), "boom".to_string())],
        };
        assert_eq!(report.total(), 4);
        assert!(!report.is_success());
        assert!(PreloadReport::default().is_success());
    }
}
