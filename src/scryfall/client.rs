//! Blocking client for the card metadata API.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::card::{ImageSize, ScryfallCard};
use super::rate_limit::RateLimiter;
use crate::cards::CardRecord;
use crate::config::ApiConfig;

/// Card metadata lookups.
///
/// Every lookup answers `None` when the card is unknown or the service cannot
/// be reached; implementations log the reason.
pub trait CardMetadataSource {
    /// Look a card up by name, exact or fuzzy.
    fn card_by_name(&self, name: &str, exact: bool) -> Option<ScryfallCard>;

    /// Look a card up by its API identifier.
    fn card_by_id(&self, id: &str) -> Option<ScryfallCard>;

    /// Image URL for an exactly-named card.
    fn image_url(&self, name: &str, preferred: ImageSize) -> Option<String> {
        self.card_by_name(name, true)?
            .image_url(preferred)
            .map(str::to_string)
    }
}

/// Rate-limited HTTP client for `api.scryfall.com` (or a compatible base URL).
#[derive(Debug)]
pub struct ScryfallClient {
    client: Client,
    base_url: String,
    limiter: RateLimiter,
}

impl ScryfallClient {
    /// Build a client from the `[api]` configuration.
    pub fn new(config: &ApiConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::new(config.rate_limit()),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Option<T> {
        self.limiter.wait();

        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = match self.client.get(&url).query(query).send() {
            Ok(response) => response,
            Err(err) => {
                warn!("Request to {} failed: {}", url, err);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Request to {} returned {}", url, status);
            return None;
        }

        match response.json() {
            Ok(body) => Some(body),
            Err(err) => {
                warn!("Unexpected response from {}: {}", url, err);
                None
            }
        }
    }
}

impl CardMetadataSource for ScryfallClient {
    fn card_by_name(&self, name: &str, exact: bool) -> Option<ScryfallCard> {
        let mode = if exact { "exact" } else { "fuzzy" };
        self.get("/cards/named", &[(mode, name)])
    }

    fn card_by_id(&self, id: &str) -> Option<ScryfallCard> {
        if id.is_empty() {
            return None;
        }
        self.get(&format!("/cards/{}", id), &[])
    }
}

/// Fill `english_card_name` for records that lack it, looking each one up by
/// its API identifier. Returns how many records were completed.
pub fn complete_missing_names<S>(records: &mut [CardRecord], source: &S) -> usize
where
    S: CardMetadataSource + ?Sized,
{
    let mut completed = 0;

    for record in records.iter_mut() {
        if record.english_card_name.is_some() {
            continue;
        }
        let Some(id) = record.scryfall_uuid.as_deref() else {
            continue;
        };

        match source.card_by_id(id) {
            Some(card) => {
                if let Some(name) = card.english_name() {
                    debug!("Completed '{}' as '{}'", record.card_name, name);
                    record.english_card_name = Some(name.to_string());
                    completed += 1;
                }
            }
            None => warn!("No metadata for '{}' ({})", record.card_name, id),
        }
    }

    completed
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct FakeSource {
        by_id: HashMap<String, ScryfallCard>,
    }

    impl CardMetadataSource for FakeSource {
        fn card_by_name(&self, name: &str, _exact: bool) -> Option<ScryfallCard> {
            self.by_id.values().find(|card| card.name == name).cloned()
        }

        fn card_by_id(&self, id: &str) -> Option<ScryfallCard> {
            self.by_id.get(id).cloned()
        }
    }

    fn fake() -> FakeSource {
        let mut card = ScryfallCard {
            id: "bolt-id".to_string(),
            name: "Lightning Bolt".to_string(),
            ..ScryfallCard::default()
        };
        card.image_uris
            .insert("normal".to_string(), "https://img.example/bolt.jpg".to_string());

        FakeSource {
            by_id: HashMap::from([(card.id.clone(), card)]),
        }
    }

    #[test]
    fn test_complete_missing_names() {
        let mut records = vec![
            CardRecord::new("Rayo").with_scryfall_uuid("bolt-id"),
            CardRecord::new("Desconocida").with_scryfall_uuid("nope"),
            CardRecord::new("Sin id"),
            CardRecord::new("Choque").with_english_name("Shock"),
        ];

        let completed = complete_missing_names(&mut records, &fake());

        assert_eq!(completed, 1);
        assert_eq!(records[0].english_card_name.as_deref(), Some("Lightning Bolt"));
        assert_eq!(records[1].english_card_name, None);
        assert_eq!(records[3].english_card_name.as_deref(), Some("Shock"));
    }

    #[test]
    fn test_default_image_url() {
        let source = fake();
        assert_eq!(
            source.image_url("Lightning Bolt", ImageSize::Large).as_deref(),
            Some("https://img.example/bolt.jpg")
        );
        assert_eq!(source.image_url("Black Lotus", ImageSize::Normal), None);
    }

    #[test]
    fn test_client_normalizes_base_url() {
        let config = ApiConfig {
            base_url: "https://api.example.com/".to_string(),
            ..ApiConfig::default()
        };
        let client = ScryfallClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
    }
}
