//! Deck rules: reconciliation against the collection and format legality.
//!
//! Both are pure functions over a `DeckAggregate` (and, for reconciliation,
//! a `CardIndex` snapshot). Neither writes files or logs results; callers
//! decide how to present them.

pub mod format;
pub mod reconcile;

pub use format::{rule_for, CardCount, FormatRule, FormatValidator, ValidationReport, FORMAT_RULES};
pub use reconcile::{Availability, EntryStatus, ReconciliationEngine, ReconciliationResult};
