//! Typed search parameters for the collection.

use serde::{Deserialize, Serialize};

use super::record::CardRecord;

/// Advanced collection query.
///
/// Every field is optional; an empty query matches every card. Fields are
/// combined with AND.
///
/// ```
/// use deckvault::cards::{CardQuery, CardRecord};
///
/// let query = CardQuery::text("bolt").with_colors(&["R"]).with_max_cmc(2);
/// let bolt = CardRecord::new("Lightning Bolt").with_colors(&["R"]).with_mana_cost("{R}");
/// assert!(query.matches(&bolt));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardQuery {
    /// Case-insensitive substring on either name.
    pub text: Option<String>,

    /// Color identity must contain at least one of these. Empty = any.
    pub colors: Vec<String>,

    /// Case-insensitive substring on the type line.
    pub card_type: Option<String>,

    /// Exact rarity (case-insensitive).
    pub rarity: Option<String>,

    /// Exact set code (case-insensitive).
    pub set_code: Option<String>,

    pub min_cmc: Option<u32>,
    pub max_cmc: Option<u32>,

    /// Maximum number of results (0 = unlimited).
    pub limit: usize,
}

impl CardQuery {
    /// Empty query (matches everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query on name text only.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_colors(mut self, colors: &[&str]) -> Self {
        self.colors = colors.iter().map(|c| (*c).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_type(mut self, card_type: impl Into<String>) -> Self {
        self.card_type = Some(card_type.into());
        self
    }

    #[must_use]
    pub fn with_rarity(mut self, rarity: impl Into<String>) -> Self {
        self.rarity = Some(rarity.into());
        self
    }

    #[must_use]
    pub fn with_set_code(mut self, set_code: impl Into<String>) -> Self {
        self.set_code = Some(set_code.into());
        self
    }

    #[must_use]
    pub fn with_min_cmc(mut self, cmc: u32) -> Self {
        self.min_cmc = Some(cmc);
        self
    }

    #[must_use]
    pub fn with_max_cmc(mut self, cmc: u32) -> Self {
        self.max_cmc = Some(cmc);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Check a single record against every present field (ignores `limit`).
    #[must_use]
    pub fn matches(&self, card: &CardRecord) -> bool {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            if !card.name_contains(&text.to_lowercase()) {
                return false;
            }
        }
        if !self.colors.is_empty() && !card.shares_color_identity(self.colors.as_slice()) {
            return false;
        }
        if let Some(card_type) = self.card_type.as_deref() {
            if !card.has_type(card_type) {
                return false;
            }
        }
        if let Some(rarity) = self.rarity.as_deref() {
            if !card.has_rarity(rarity) {
                return false;
            }
        }
        if let Some(set_code) = self.set_code.as_deref() {
            if !card.in_set(set_code) {
                return false;
            }
        }

        let cmc = card.converted_mana_cost();
        if self.min_cmc.is_some_and(|min| cmc < min) {
            return false;
        }
        if self.max_cmc.is_some_and(|max| cmc > max) {
            return false;
        }
        true
    }
}
