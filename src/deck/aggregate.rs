//! Decks as quantity-aware multisets of cards.
//!
//! A `DeckAggregate` keeps at most one `DeckEntry` per card identity, in
//! insertion order. Adding a card that is already present merges the
//! quantities; removing down to zero deletes the entry. `total_cards` is
//! maintained incrementally and always equals the sum of entry quantities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::{CardIndex, CardRecord};
use crate::error::{DeckError, DeckResult};

/// Type groups used by deck analysis and text export, in priority order.
pub const TYPE_GROUPS: [&str; 7] = [
    "Creature",
    "Instant",
    "Sorcery",
    "Enchantment",
    "Artifact",
    "Planeswalker",
    "Land",
];

/// One card of a deck and how many copies it needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeckEntry {
    /// The resolved card.
    pub card: CardRecord,
    /// Copies in the deck (always >= 1).
    pub quantity: u32,
}

impl DeckEntry {
    /// Primary name of the card.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.card.card_name
    }
}

/// How much of a card to remove.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveQuantity {
    /// Remove this many copies (the entry goes away if that is all of them).
    Count(u32),
    /// Remove the entry entirely.
    All,
}

impl From<u32> for RemoveQuantity {
    fn from(count: u32) -> Self {
        RemoveQuantity::Count(count)
    }
}

/// Summary statistics for a deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckAnalysis {
    pub name: String,
    pub format: Option<String>,
    pub total_cards: u32,
    pub unique_cards: usize,
    pub color_distribution: BTreeMap<String, u32>,
    pub mana_curve: BTreeMap<u32, u32>,
    pub type_distribution: BTreeMap<String, u32>,
    /// Number of entries (not copies) per type group in `TYPE_GROUPS`.
    pub entries_per_group: BTreeMap<String, usize>,
}

/// A named deck.
///
/// ## Example
///
/// ```
/// use deckvault::cards::CardRecord;
/// use deckvault::deck::{DeckAggregate, RemoveQuantity};
///
/// let bolt = CardRecord::new("Lightning Bolt");
/// let mut deck = DeckAggregate::new("Burn");
///
/// deck.add(&bolt, 2).unwrap();
/// deck.add(&bolt, 2).unwrap();
/// assert_eq!(deck.total_cards(), 4);
/// assert_eq!(deck.unique_card_count(), 1);
///
/// assert!(deck.remove("lightning bolt", RemoveQuantity::All));
/// assert!(deck.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DeckFile", into = "DeckFile")]
pub struct DeckAggregate {
    /// Deck name (also the source of its file name).
    pub name: String,
    /// Format name, e.g. `commander`.
    pub format: Option<String>,
    /// Free-text description.
    pub description: Option<String>,

    entries: Vec<DeckEntry>,
    total_cards: u32,
}

impl DeckAggregate {
    /// Create an empty deck.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add copies of a card, merging with an existing entry of the same identity.
    ///
    /// Fails with `ZeroQuantity` if `quantity` is 0 and with `QuantityOverflow`
    /// if the deck total would not fit in a `u32`; either way the deck is
    /// left untouched.
    pub fn add(&mut self, card: &CardRecord, quantity: u32) -> DeckResult<()> {
        if quantity == 0 {
            return Err(DeckError::ZeroQuantity);
        }
        // Every entry quantity is bounded by the total.
        let total = self
            .total_cards
            .checked_add(quantity)
            .ok_or(DeckError::QuantityOverflow)?;

        match self.position_of_identity(card) {
            Some(position) => self.entries[position].quantity += quantity,
            None => self.entries.push(DeckEntry {
                card: card.clone(),
                quantity,
            }),
        }
        self.total_cards = total;
        Ok(())
    }

    /// Resolve `name` through the collection index, then add it.
    ///
    /// Resolution happens before any mutation, so an unknown name leaves the
    /// deck unchanged.
    pub fn add_by_name(&mut self, index: &CardIndex, name: &str, quantity: u32) -> DeckResult<()> {
        if quantity == 0 {
            return Err(DeckError::ZeroQuantity);
        }
        let card = index
            .find_by_name(name)
            .ok_or_else(|| DeckError::CardNotFound(name.to_string()))?;
        self.add(card, quantity)
    }

    /// Remove copies of the card named `name`.
    ///
    /// Returns `false` (and does nothing) if no entry matches.
    pub fn remove(&mut self, name: &str, quantity: impl Into<RemoveQuantity>) -> bool {
        let Some(position) = self.position_of_name(name) else {
            return false;
        };

        let current = self.entries[position].quantity;
        match quantity.into() {
            RemoveQuantity::Count(count) if count < current => {
                self.entries[position].quantity -= count;
                self.total_cards -= count;
            }
            _ => {
                self.entries.remove(position);
                self.total_cards -= current;
            }
        }
        true
    }

    /// Set the number of copies of a card; 0 removes it.
    ///
    /// Fails with `QuantityOverflow` (leaving the deck untouched) if the new
    /// total would not fit in a `u32`.
    pub fn set_quantity(&mut self, card: &CardRecord, quantity: u32) -> DeckResult<()> {
        let position = self.position_of_identity(card);
        let current = position.map_or(0, |position| self.entries[position].quantity);
        let total = (self.total_cards - current)
            .checked_add(quantity)
            .ok_or(DeckError::QuantityOverflow)?;

        match position {
            Some(position) if quantity == 0 => {
                self.entries.remove(position);
            }
            Some(position) => self.entries[position].quantity = quantity,
            None if quantity == 0 => {}
            None => self.entries.push(DeckEntry {
                card: card.clone(),
                quantity,
            }),
        }
        self.total_cards = total;
        Ok(())
    }

    /// Find the entry for a card by either of its names.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&DeckEntry> {
        self.position_of_name(name).map(|position| &self.entries[position])
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeckEntry> {
        self.entries.iter()
    }

    /// Sum of all entry quantities.
    #[must_use]
    pub fn total_cards(&self) -> u32 {
        self.total_cards
    }

    /// Number of distinct cards.
    #[must_use]
    pub fn unique_card_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies per color-identity symbol.
    #[must_use]
    pub fn color_distribution(&self) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            for color in &entry.card.color_identity {
                *counts.entry(color.clone()).or_default() += entry.quantity;
            }
        }
        counts
    }

    /// Copies per converted mana cost.
    #[must_use]
    pub fn mana_curve(&self) -> BTreeMap<u32, u32> {
        let mut curve = BTreeMap::new();
        for entry in &self.entries {
            *curve.entry(entry.card.converted_mana_cost()).or_default() += entry.quantity;
        }
        curve
    }

    /// Copies per main type.
    #[must_use]
    pub fn type_distribution(&self) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            if let Some(main_type) = entry.card.main_type() {
                *counts.entry(main_type.to_string()).or_default() += entry.quantity;
            }
        }
        counts
    }

    /// Entries whose type line contains `card_type` (case-insensitive).
    pub fn cards_of_type<'a>(&'a self, card_type: &'a str) -> impl Iterator<Item = &'a DeckEntry> {
        self.entries.iter().filter(move |entry| entry.card.has_type(card_type))
    }

    /// Full statistics summary.
    #[must_use]
    pub fn analyze(&self) -> DeckAnalysis {
        let entries_per_group = TYPE_GROUPS
            .iter()
            .map(|group| (group.to_string(), self.cards_of_type(group).count()))
            .collect();

        DeckAnalysis {
            name: self.name.clone(),
            format: self.format.clone(),
            total_cards: self.total_cards,
            unique_cards: self.unique_card_count(),
            color_distribution: self.color_distribution(),
            mana_curve: self.mana_curve(),
            type_distribution: self.type_distribution(),
            entries_per_group,
        }
    }

    fn position_of_identity(&self, card: &CardRecord) -> Option<usize> {
        self.entries.iter().position(|entry| entry.card.same_identity(card))
    }

    fn position_of_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.card.matches_name(name))
    }
}

/// On-disk shape: `{name, format, description, cards: [card + quantity]}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DeckFile {
    pub(crate) name: String,
    pub(crate) format: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) cards: Vec<CardRecord>,
}

impl From<DeckAggregate> for DeckFile {
    fn from(deck: DeckAggregate) -> Self {
        let cards = deck
            .entries
            .into_iter()
            .map(|entry| CardRecord {
                quantity: entry.quantity,
                ..entry.card
            })
            .collect();

        Self {
            name: deck.name,
            format: deck.format,
            description: deck.description,
            cards,
        }
    }
}

impl From<DeckFile> for DeckAggregate {
    /// Rebuilds through `add`, so zero-quantity rows are dropped and
    /// duplicate identities merged.
    fn from(file: DeckFile) -> Self {
        let mut deck = DeckAggregate {
            name: file.name,
            format: file.format,
            description: file.description,
            ..DeckAggregate::default()
        };
        for card in file.cards {
            let quantity = card.quantity;
            // Zero-quantity rows are rejected by `add` and simply dropped.
            let _ = deck.add(&card, quantity);
        }
        deck
    }
}
