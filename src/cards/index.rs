//! Collection index for card lookup.
//!
//! The `CardIndex` holds every loaded record in load order and a lookup
//! table from lower-cased name to record. Both name fields of every record
//! are indexed.
//!
//! ## Name collisions
//!
//! When two records share a name, the record loaded later wins that name.
//! Lookups are therefore not stable under duplicate names in the source data;
//! `search` and the filters still see every record.
//!
//! ## Snapshots
//!
//! Storage uses `im` persistent structures, so `snapshot()` is O(1) and a
//! reconciliation can keep reading a stable view while the collection is
//! reloaded.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::BuildHasherDefault;

use im::Vector;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use super::query::CardQuery;
use super::record::{CardRecord, SUPERTYPES};

/// Lower-cased name -> position in `records`.
type NameTable = im::HashMap<String, usize, BuildHasherDefault<FxHasher>>;

/// Collection-wide statistics, weighted by owned quantity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub unique_cards: usize,
    pub total_quantity: u64,
    pub color_distribution: BTreeMap<String, u64>,
    pub rarity_distribution: BTreeMap<String, u64>,
    pub type_distribution: BTreeMap<String, u64>,
}

/// Multi-key index over the owned collection.
///
/// ## Example
///
/// ```
/// use deckvault::cards::{CardIndex, CardRecord};
///
/// let index = CardIndex::build(vec![
///     CardRecord::new("Rayo").with_english_name("Lightning Bolt").with_quantity(2),
/// ]);
///
/// assert_eq!(index.find_by_name("lightning bolt").unwrap().quantity, 2);
/// assert_eq!(index.find_by_name("RAYO").unwrap().quantity, 2);
/// assert!(index.find_by_name("Shock").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardIndex {
    records: Vector<CardRecord>,
    by_name: NameTable,
}

impl CardIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from records in load order.
    #[must_use]
    pub fn build(records: impl IntoIterator<Item = CardRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Append a record and index both of its names (later wins).
    pub fn insert(&mut self, record: CardRecord) {
        let position = self.records.len();
        for name in record.names() {
            self.by_name.insert(name.to_lowercase(), position);
        }
        self.records.push_back(record);
    }

    /// Cheap copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Case-insensitive exact lookup against either indexed name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CardRecord> {
        self.by_name
            .get(name.to_lowercase().as_str())
            .and_then(|&position| self.records.get(position))
    }

    /// Owned copies of the card with this name (0 if unknown).
    #[must_use]
    pub fn owned_quantity(&self, name: &str) -> u32 {
        self.find_by_name(name).map_or(0, |record| record.quantity)
    }

    /// Number of records (not names).
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all records in load order.
    pub fn iter(&self) -> impl Iterator<Item = &CardRecord> {
        self.records.iter()
    }

    /// Substring search on either name, in load order.
    ///
    /// `limit == 0` means unlimited.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<&CardRecord> {
        let needle = query.to_lowercase();
        let matches = self.records.iter().filter(|card| card.name_contains(&needle));
        take_limit(matches, limit)
    }

    /// Cards whose color identity shares at least one of `colors`.
    #[must_use]
    pub fn by_colors<S: AsRef<str>>(&self, colors: &[S]) -> Vec<&CardRecord> {
        self.find(|card| card.shares_color_identity(colors))
    }

    /// Cards whose type line contains `card_type`.
    #[must_use]
    pub fn by_type(&self, card_type: &str) -> Vec<&CardRecord> {
        self.find(|card| card.has_type(card_type))
    }

    #[must_use]
    pub fn by_rarity(&self, rarity: &str) -> Vec<&CardRecord> {
        self.find(|card| card.has_rarity(rarity))
    }

    #[must_use]
    pub fn by_set(&self, set_code: &str) -> Vec<&CardRecord> {
        self.find(|card| card.in_set(set_code))
    }

    /// Cards matching an arbitrary predicate, in load order.
    pub fn find<F>(&self, predicate: F) -> Vec<&CardRecord>
    where
        F: Fn(&CardRecord) -> bool,
    {
        self.records.iter().filter(|card| predicate(card)).collect()
    }

    /// Run a structured query.
    #[must_use]
    pub fn query(&self, query: &CardQuery) -> Vec<&CardRecord> {
        let matches = self.records.iter().filter(|card| query.matches(card));
        take_limit(matches, query.limit)
    }

    /// Sorted, de-duplicated set codes.
    #[must_use]
    pub fn available_sets(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|card| card.set_code.clone())
            .filter(|code| !code.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted, de-duplicated type words (supertypes excluded).
    #[must_use]
    pub fn available_types(&self) -> Vec<String> {
        self.records
            .iter()
            .flat_map(|card| card.type_words())
            .filter(|word| !SUPERTYPES.contains(word))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Collection statistics weighted by owned quantity.
    #[must_use]
    pub fn statistics(&self) -> CollectionStats {
        let mut stats = CollectionStats {
            unique_cards: self.records.len(),
            ..CollectionStats::default()
        };

        for card in &self.records {
            let quantity = u64::from(card.quantity);
            stats.total_quantity += quantity;

            for color in &card.color_identity {
                *stats.color_distribution.entry(color.clone()).or_default() += quantity;
            }
            if let Some(rarity) = card.rarity.as_deref().filter(|r| !r.is_empty()) {
                *stats.rarity_distribution.entry(rarity.to_string()).or_default() += quantity;
            }
            if let Some(main_type) = card.main_type() {
                *stats.type_distribution.entry(main_type.to_string()).or_default() += quantity;
            }
        }

        stats
    }
}

impl FromIterator<CardRecord> for CardIndex {
    fn from_iter<I: IntoIterator<Item = CardRecord>>(iter: I) -> Self {
        Self::build(iter)
    }
}

fn take_limit<'a>(matches: impl Iterator<Item = &'a CardRecord>, limit: usize) -> Vec<&'a CardRecord> {
    if limit == 0 {
        matches.collect()
    } else {
        matches.take(limit).collect()
    }
}
