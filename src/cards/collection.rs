//! Collection file loading.
//!
//! The collection is a semicolon-delimited file with a header row, one card
//! per row. Columns are matched by header name, so their order does not
//! matter and missing optional columns read as empty:
//!
//! ```text
//! card_name;english_card_name;quantity;mana_cost;type_line;colors;color_identity;rarity;set_code
//! Rayo;Lightning Bolt;2;{R};Instant;['R'];['R'];common;LEA
//! ```
//!
//! Malformed rows (bad quantity, no name, undecodable fields) are skipped
//! with a warning and counted; they never abort the load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::index::CardIndex;
use super::record::{CardRecord, ColorSet};
use crate::config::DataConfig;
use crate::error::{CollectionError, CollectionResult};

/// Raw row as it appears in the file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CollectionRow {
    card_name: String,
    english_card_name: String,
    quantity: String,
    scryfall_uuid: String,
    mana_cost: String,
    type_line: String,
    oracle_text: String,
    power: String,
    toughness: String,
    colors: String,
    color_identity: String,
    rarity: String,
    set_code: String,
    collector_number: String,
    image_url: String,
}

/// Outcome of loading a collection file.
#[derive(Clone, Debug, Default)]
pub struct CollectionLoad {
    /// Successfully parsed records, in file order.
    pub records: Vec<CardRecord>,
    /// Number of rows skipped as malformed.
    pub skipped: usize,
}

impl CollectionLoad {
    /// Build a lookup index over the loaded records.
    #[must_use]
    pub fn into_index(self) -> CardIndex {
        CardIndex::build(self.records)
    }
}

/// Load a collection file from disk.
///
/// The file must exist; rows that fail to parse are skipped.
pub fn load_collection(path: impl AsRef<Path>) -> CollectionResult<CollectionLoad> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => CollectionError::NotFound(path.to_path_buf()),
        _ => CollectionError::Io(err),
    })?;

    let load = read_collection(file)?;
    info!(
        "Loaded {} cards from {} ({} rows skipped)",
        load.records.len(),
        path.display(),
        load.skipped
    );
    Ok(load)
}

/// Read collection rows from any reader.
pub fn read_collection<R: Read>(reader: R) -> CollectionResult<CollectionLoad> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut load = CollectionLoad::default();
    for (row_number, row) in reader.deserialize::<CollectionRow>().enumerate() {
        let line = row_number + 2;
        let row = match row {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Err(CollectionError::Csv(err)),
            Err(err) => {
                warn!("Skipping collection row {}: {}", line, err);
                load.skipped += 1;
                continue;
            }
        };

        match row.into_record() {
            Ok(record) => load.records.push(record),
            Err(reason) => {
                warn!("Skipping collection row {}: {}", line, reason);
                load.skipped += 1;
            }
        }
    }

    Ok(load)
}

impl CardIndex {
    /// Load the configured collection file and index it.
    pub fn load(config: &DataConfig) -> CollectionResult<Self> {
        Ok(load_collection(&config.collection_file)?.into_index())
    }
}

impl CollectionRow {
    fn into_record(self) -> Result<CardRecord, String> {
        let quantity = parse_quantity(&self.quantity)?;

        let english_card_name = non_empty(self.english_card_name);
        let card_name = match non_empty(self.card_name) {
            Some(name) => name,
            None => english_card_name
                .clone()
                .ok_or_else(|| "row has no card name".to_string())?,
        };

        Ok(CardRecord {
            card_name,
            english_card_name,
            quantity,
            scryfall_uuid: non_empty(self.scryfall_uuid),
            mana_cost: non_empty(self.mana_cost),
            type_line: non_empty(self.type_line),
            oracle_text: non_empty(self.oracle_text),
            power: non_empty(self.power),
            toughness: non_empty(self.toughness),
            colors: parse_color_list(&self.colors),
            color_identity: parse_color_list(&self.color_identity),
            rarity: non_empty(self.rarity),
            set_code: non_empty(self.set_code),
            collector_number: non_empty(self.collector_number),
            image_url: non_empty(self.image_url),
        })
    }
}

/// Empty quantity means none owned.
fn parse_quantity(raw: &str) -> Result<u32, String> {
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>()
        .map_err(|_| format!("invalid quantity {:?}", raw))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parse a color column.
///
/// Accepts `R`, `R,G`, `R G`, `['R', 'G']` and `{R}{G}`: every run of
/// letters is one symbol, upper-cased.
#[must_use]
pub fn parse_color_list(raw: &str) -> ColorSet {
    raw.split(|c: char| !c.is_alphabetic())
        .filter(|symbol| !symbol.is_empty())
        .map(str::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_list() {
        assert_eq!(parse_color_list("['R', 'G']").as_slice(), ["R", "G"]);
        assert_eq!(parse_color_list("w,u").as_slice(), ["W", "U"]);
        assert_eq!(parse_color_list("{B}{R}").as_slice(), ["B", "R"]);
        assert!(parse_color_list("[]").is_empty());
        assert!(parse_color_list("").is_empty());
    }

    #[test]
    fn test_read_rows_by_header_name() {
        let data = "\
quantity;card_name;english_card_name;type_line;colors
2;Rayo;Lightning Bolt;Instant;['R']
;Isla;Island;Basic Land — Island;[]
";
        let load = read_collection(data.as_bytes()).unwrap();

        assert_eq!(load.skipped, 0);
        assert_eq!(load.records.len(), 2);
        assert_eq!(load.records[0].card_name, "Rayo");
        assert_eq!(load.records[0].english_card_name.as_deref(), Some("Lightning Bolt"));
        assert_eq!(load.records[0].quantity, 2);
        assert_eq!(load.records[0].colors.as_slice(), ["R"]);
        assert_eq!(load.records[1].quantity, 0);
        assert_eq!(load.records[1].mana_cost, None);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let data = "\
card_name;english_card_name;quantity
Rayo;Lightning Bolt;two
;;4
Counterspell;;-1
Shock;;1
";
        let load = read_collection(data.as_bytes()).unwrap();

        assert_eq!(load.skipped, 3);
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].card_name, "Shock");
    }

    #[test]
    fn test_english_name_fills_missing_primary_name() {
        let data = "card_name;english_card_name;quantity\n;Lightning Bolt;1\n;;3\n";
        let load = read_collection(data.as_bytes()).unwrap();
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].card_name, "Lightning Bolt");
        assert_eq!(load.skipped, 1);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = load_collection("/nonexistent/collection.csv");
        assert!(matches!(result, Err(CollectionError::NotFound(_))));
    }
}
