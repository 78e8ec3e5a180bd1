//! Deck vs. collection reconciliation.
//!
//! Every deck entry is classified by how many copies the collection owns:
//!
//! | Owned | Status | Shortfall |
//! |---|---|---|
//! | 0 | missing | needed |
//! | 1 ..= needed-1 | partial | needed - owned |
//! | >= needed | available | 0 |
//!
//! Reconciliation is a pure function of the deck and an index snapshot.

use serde::{Deserialize, Serialize};

use crate::cards::CardIndex;
use crate::deck::{DeckAggregate, DeckEntry};

/// Classification of one deck entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    Missing,
    Partial,
    Available,
}

/// Requirement vs. ownership for one deck entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryStatus {
    pub entry: DeckEntry,
    pub needed: u32,
    pub owned: u32,
    pub shortfall: u32,
}

impl EntryStatus {
    #[must_use]
    pub fn availability(&self) -> Availability {
        if self.owned == 0 {
            Availability::Missing
        } else if self.owned < self.needed {
            Availability::Partial
        } else {
            Availability::Available
        }
    }

    /// Owned copies that count towards the deck (capped at `needed`).
    #[must_use]
    pub fn covered(&self) -> u32 {
        self.owned.min(self.needed)
    }
}

/// Outcome of comparing a deck with the collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconciliationResult {
    /// Entries with no owned copies, in deck order.
    pub missing: Vec<EntryStatus>,
    /// Entries with enough owned copies, in deck order.
    pub available: Vec<EntryStatus>,
    /// Entries with some but not enough owned copies, in deck order.
    pub partial: Vec<EntryStatus>,

    pub needed_total: u32,
    pub available_total: u32,
    pub missing_total: u32,

    /// `available_total / needed_total * 100`, two decimals; 0 for an empty deck.
    pub completion_percentage: f64,
}

impl ReconciliationResult {
    /// True when every needed copy is owned (vacuously false for an empty deck).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.needed_total > 0 && self.missing_total == 0
    }

    /// Cards still to acquire: `(name, shortfall)` for partial then missing entries.
    #[must_use]
    pub fn shopping_list(&self) -> Vec<(String, u32)> {
        self.partial
            .iter()
            .chain(&self.missing)
            .map(|status| (status.entry.name().to_string(), status.shortfall))
            .collect()
    }
}

/// Compares decks against the owned collection.
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Classify every entry of `deck` against `index`.
    ///
    /// Owned copies are looked up by the entry's primary name, then by its
    /// alternate name; an unknown card owns 0.
    #[must_use]
    pub fn compare(deck: &DeckAggregate, index: &CardIndex) -> ReconciliationResult {
        let mut result = ReconciliationResult::default();

        for entry in deck.iter() {
            let needed = entry.quantity;
            let owned = owned_copies(entry, index);
            let status = EntryStatus {
                entry: entry.clone(),
                needed,
                owned,
                shortfall: needed.saturating_sub(owned),
            };

            result.needed_total += needed;
            result.available_total += status.covered();

            match status.availability() {
                Availability::Missing => result.missing.push(status),
                Availability::Partial => result.partial.push(status),
                Availability::Available => result.available.push(status),
            }
        }

        result.missing_total = result.needed_total - result.available_total;
        result.completion_percentage = completion(result.available_total, result.needed_total);
        result
    }
}

fn owned_copies(entry: &DeckEntry, index: &CardIndex) -> u32 {
    entry
        .card
        .names()
        .find_map(|name| index.find_by_name(name))
        .map_or(0, |record| record.quantity)
}

fn completion(available: u32, needed: u32) -> f64 {
    if needed == 0 {
        return 0.0;
    }
    let percentage = f64::from(available) / f64::from(needed) * 100.0;
    (percentage * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardRecord;

    #[test]
    fn test_completion_rounding() {
        assert_eq!(completion(0, 0), 0.0);
        assert_eq!(completion(1, 3), 33.33);
        assert_eq!(completion(2, 3), 66.67);
        assert_eq!(completion(4, 4), 100.0);
    }

    #[test]
    fn test_lookup_falls_back_to_alternate_name() {
        let index = CardIndex::build(vec![CardRecord::new("Lightning Bolt").with_quantity(4)]);
        let mut deck = DeckAggregate::new("Burn");
        deck.add(&CardRecord::new("Rayo").with_english_name("Lightning Bolt"), 4).unwrap();

        let result = ReconciliationEngine::compare(&deck, &index);
        assert_eq!(result.available.len(), 1);
        assert!(result.is_complete());
    }

    #[test]
    fn test_shopping_list() {
        let index = CardIndex::build(vec![CardRecord::new("Shock").with_quantity(1)]);
        let mut deck = DeckAggregate::new("Burn");
        deck.add(&CardRecord::new("Shock"), 4).unwrap();
        deck.add(&CardRecord::new("Black Lotus"), 1).unwrap();

        let result = ReconciliationEngine::compare(&deck, &index);
        assert_eq!(
            result.shopping_list(),
            vec![("Shock".to_string(), 3), ("Black Lotus".to_string(), 1)]
        );
        assert!(!result.is_complete());
    }
}
