//! Decks: the in-memory aggregate, text lists, and the on-disk store.
//!
//! ## Key Types
//!
//! - `DeckAggregate`: Named multiset of cards with merge/remove invariants
//! - `DeckEntry`: One card and its quantity
//! - `DeckStore`: One JSON file per deck
//! - `DeckImport`: Result of reading a text deck list or an EDHREC export

pub mod aggregate;
pub mod edhrec;
pub mod store;
pub mod text;

pub use aggregate::{DeckAggregate, DeckAnalysis, DeckEntry, RemoveQuantity, TYPE_GROUPS};
pub use edhrec::{import_edhrec_csv, parse_edhrec_csv};
pub use store::{sanitize_deck_filename, DeckStore, DeckSummary};
pub use text::{export_deck_text, import_deck_text, parse_deck_text, DeckImport, DeckLine};
