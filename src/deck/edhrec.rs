//! EDHREC deck exports.
//!
//! An export is a comma-delimited file with a header row and one row per
//! copy. The card name column is the first header equal to `Card`, `Name`
//! or `Card Name` (case-insensitive); every other column is ignored.
//!
//! ```text
//! Card,Category
//! Sol Ring,Artifacts
//! Forest,Lands
//! Forest,Lands
//! ```

use std::io::Read;

use csv::{ReaderBuilder, Trim};

use super::text::{resolve_lines, DeckImport, DeckLine};
use crate::cards::CardIndex;
use crate::error::{ImportError, ImportResult};

/// Header names accepted for the card name column, lower-cased.
const NAME_COLUMNS: [&str; 3] = ["card", "name", "card name"];

/// Count rows per card name, in order of first appearance.
///
/// Rows with an empty name are skipped. Names are compared exactly after
/// trimming; case folding happens later, when the deck merges identities.
pub fn parse_edhrec_csv<R: Read>(reader: R) -> ImportResult<Vec<DeckLine>> {
    let mut csv = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let column = headers
        .iter()
        .position(|header| NAME_COLUMNS.contains(&header.to_lowercase().as_str()))
        .ok_or_else(|| ImportError::MissingNameColumn {
            found: headers.iter().map(str::to_string).collect(),
        })?;

    let mut lines: Vec<DeckLine> = Vec::new();
    for row in csv.records() {
        let row = row?;
        let Some(name) = row.get(column).filter(|name| !name.is_empty()) else {
            continue;
        };

        match lines.iter_mut().find(|line| line.name == name) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => lines.push(DeckLine {
                quantity: 1,
                name: name.to_string(),
            }),
        }
    }

    Ok(lines)
}

/// Build a deck from an EDHREC export, resolving names through `index`.
pub fn import_edhrec_csv<R: Read>(
    reader: R,
    deck_name: &str,
    index: &CardIndex,
) -> ImportResult<DeckImport> {
    let lines = parse_edhrec_csv(reader)?;
    Ok(resolve_lines(lines, deck_name, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardRecord;

    #[test]
    fn test_counts_one_copy_per_row() {
        let data = "Card,Category\nSol Ring,Artifacts\nForest,Lands\n Forest ,Lands\n,Lands\nForest,Lands\n";
        let lines = parse_edhrec_csv(data.as_bytes()).unwrap();

        assert_eq!(
            lines,
            vec![
                DeckLine { quantity: 1, name: "Sol Ring".to_string() },
                DeckLine { quantity: 3, name: "Forest".to_string() },
            ]
        );
    }

    #[test]
    fn test_name_column_is_case_insensitive() {
        for data in ["card name,qty\nOpt,1\n", "Qty,NAME\n1,Opt\n", "x,CARD\n1,Opt\n"] {
            let lines = parse_edhrec_csv(data.as_bytes()).unwrap();
            assert_eq!(lines.len(), 1, "{:?}", data);
            assert_eq!(lines[0].name, "Opt");
        }
    }

    #[test]
    fn test_missing_name_column() {
        let data = "Quantity,Category\n1,Lands\n";

        match parse_edhrec_csv(data.as_bytes()) {
            Err(ImportError::MissingNameColumn { found }) => {
                assert_eq!(found, vec!["Quantity", "Category"]);
            }
            other => panic!("expected MissingNameColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_import_resolves_through_index() {
        let index = CardIndex::build(vec![
            CardRecord::new("Anillo Solar").with_english_name("Sol Ring").with_quantity(1),
            CardRecord::new("Bosque").with_english_name("Forest").with_quantity(10),
        ]);
        let data = "Name\nSol Ring\nForest\nForest\nMana Crypt\n";

        let import = import_edhrec_csv(data.as_bytes(), "Commander", &index).unwrap();

        assert_eq!(import.deck.total_cards(), 3);
        assert_eq!(import.deck.find("forest").unwrap().quantity, 2);
        assert_eq!(import.unresolved.len(), 1);
        assert_eq!(import.unresolved[0].name, "Mana Crypt");
    }
}
