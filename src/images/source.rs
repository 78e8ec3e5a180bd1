//! Where cache misses are downloaded from.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{CacheError, CacheResult};

/// Fetches raw image bytes for a URL.
///
/// Implementations must return only after the whole body is received, and
/// must be safe to call from several preload workers at once.
pub trait ImageSource: Send + Sync {
    /// Download `url`, giving up after `timeout`.
    fn fetch(&self, url: &str, timeout: Duration) -> CacheResult<Vec<u8>>;
}

/// Blocking HTTP source.
#[derive(Clone, Debug)]
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    /// Build a client sending `user_agent` with every request.
    pub fn new(user_agent: &str) -> CacheResult<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str, timeout: Duration) -> CacheResult<Vec<u8>> {
        debug!("Downloading image {}", url);
        let response = self.client.get(url).timeout(timeout).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes()?.to_vec())
    }
}
