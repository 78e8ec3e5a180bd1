use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Enforces a minimum spacing between consecutive requests.
///
/// Callers block in `wait` until `min_delay` has passed since the previous
/// caller was released.
#[derive(Debug)]
pub struct RateLimiter {
    min_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Block until the next request may be sent, then record it.
    pub fn wait(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_delay {
                thread::sleep(self.min_delay - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}
