//! Card system: records, collection loading, lookup index, queries.
//!
//! ## Key Types
//!
//! - `CardRecord`: One card of the owned collection
//! - `CardIndex`: Multi-key (primary + alternate name) lookup over the collection
//! - `CardQuery`: Typed advanced-search parameters
//! - `CollectionLoad`: Result of reading the collection file
//!
//! "Not found" is always a normal `None`/empty result, never an error.

pub mod collection;
pub mod index;
pub mod query;
pub mod record;

pub use collection::{load_collection, parse_color_list, read_collection, CollectionLoad};
pub use index::{CardIndex, CollectionStats};
pub use query::CardQuery;
pub use record::{CardRecord, ColorSet};
