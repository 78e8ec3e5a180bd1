//! Plain-text deck lists.
//!
//! The format is line oriented:
//!
//! ```text
//! // Burn
//! // Format: modern
//!
//! // Instants
//! 4x Lightning Bolt
//! 20 Mountain
//! ```
//!
//! Blank lines and `//` comments are ignored on import. A card line is
//! `<quantity>x <name>` or `<quantity> <name>`.

use std::fmt::Write as _;

use tracing::warn;

use super::aggregate::{DeckAggregate, DeckEntry, TYPE_GROUPS};
use crate::cards::CardIndex;

/// Section headers written on export, parallel to `TYPE_GROUPS`.
const SECTION_TITLES: [&str; 7] = [
    "Creatures",
    "Instants",
    "Sorceries",
    "Enchantments",
    "Artifacts",
    "Planeswalkers",
    "Lands",
];

/// One parsed card line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeckLine {
    pub quantity: u32,
    pub name: String,
}

/// Result of importing a deck list against the collection.
#[derive(Clone, Debug)]
pub struct DeckImport {
    pub deck: DeckAggregate,
    /// Lines whose card name is not in the collection.
    pub unresolved: Vec<DeckLine>,
}

/// Parse card lines, skipping comments, blanks and unparseable lines.
#[must_use]
pub fn parse_deck_text(text: &str) -> Vec<DeckLine> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<DeckLine> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("//") {
        return None;
    }

    let (count, name) = line.split_once(char::is_whitespace)?;
    let count = count.strip_suffix(['x', 'X']).unwrap_or(count);
    let quantity = count.parse::<u32>().ok().filter(|&q| q > 0)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(DeckLine {
        quantity,
        name: name.to_string(),
    })
}

/// Build a deck from a text list, resolving every name through `index`.
///
/// Unknown names are reported in `unresolved` and not added.
#[must_use]
pub fn import_deck_text(text: &str, deck_name: &str, index: &CardIndex) -> DeckImport {
    resolve_lines(parse_deck_text(text), deck_name, index)
}

/// Add every line whose name `index` knows; collect the rest.
pub(crate) fn resolve_lines(
    lines: Vec<DeckLine>,
    deck_name: &str,
    index: &CardIndex,
) -> DeckImport {
    let mut deck = DeckAggregate::new(deck_name);
    let mut unresolved = Vec::new();

    for line in lines {
        let Some(card) = index.find_by_name(&line.name) else {
            warn!("Card not in collection: {}", line.name);
            unresolved.push(line);
            continue;
        };
        if let Err(err) = deck.add(card, line.quantity) {
            warn!("Skipping {} x{}: {}", line.name, line.quantity, err);
        }
    }

    DeckImport { deck, unresolved }
}

/// Render a deck as a text list grouped by type.
///
/// A card goes in the first matching section (an artifact creature is a
/// creature); cards matching none go under `Others`. Sections are sorted by
/// primary name.
#[must_use]
pub fn export_deck_text(deck: &DeckAggregate) -> String {
    let mut sections: Vec<Vec<&DeckEntry>> = vec![Vec::new(); TYPE_GROUPS.len() + 1];
    for entry in deck.iter() {
        let slot = TYPE_GROUPS
            .iter()
            .position(|group| entry.card.has_type(group))
            .unwrap_or(TYPE_GROUPS.len());
        sections[slot].push(entry);
    }

    let mut out = String::new();
    let _ = writeln!(out, "// {}", deck.name);
    if let Some(description) = deck.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "// {}", description);
    }
    let _ = writeln!(
        out,
        "// Format: {}",
        deck.format.as_deref().unwrap_or("Not specified")
    );
    out.push('\n');

    let titles = SECTION_TITLES.iter().copied().chain(std::iter::once("Others"));
    let mut first = true;
    for (title, mut entries) in titles.zip(sections) {
        if entries.is_empty() {
            continue;
        }
        if !first {
            out.push('\n');
        }
        first = false;

        entries.sort_by(|a, b| a.name().cmp(b.name()));
        let _ = writeln!(out, "// {}", title);
        for entry in entries {
            let _ = writeln!(out, "{}x {}", entry.quantity, entry.name());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardRecord;

    #[test]
    fn test_parse_lines() {
        let lines = parse_deck_text(
            "// comment\n\n4x Lightning Bolt\n20 Mountain\n  2X  Shock  \nx Broken\n0 Nothing\nJustAName\n",
        );

        assert_eq!(
            lines,
            vec![
                DeckLine { quantity: 4, name: "Lightning Bolt".to_string() },
                DeckLine { quantity: 20, name: "Mountain".to_string() },
                DeckLine { quantity: 2, name: "Shock".to_string() },
            ]
        );
    }

    #[test]
    fn test_import_reports_unresolved() {
        let index = CardIndex::build(vec![
            CardRecord::new("Rayo").with_english_name("Lightning Bolt").with_quantity(2),
        ]);

        let import = import_deck_text("4x Lightning Bolt\n1 Black Lotus\n", "Burn", &index);

        assert_eq!(import.deck.name, "Burn");
        assert_eq!(import.deck.total_cards(), 4);
        assert_eq!(import.deck.entries()[0].name(), "Rayo");
        assert_eq!(import.unresolved.len(), 1);
        assert_eq!(import.unresolved[0].name, "Black Lotus");
    }

    #[test]
    fn test_export_groups_and_sorts() {
        let mut deck = DeckAggregate::new("Mix").with_format("modern");
        deck.add(&CardRecord::new("Shock").with_type_line("Instant"), 2).unwrap();
        deck.add(&CardRecord::new("Mountain").with_type_line("Basic Land — Mountain"), 20).unwrap();
        deck.add(&CardRecord::new("Lightning Bolt").with_type_line("Instant"), 4).unwrap();
        deck.add(&CardRecord::new("Ornithopter").with_type_line("Artifact Creature — Thopter"), 1).unwrap();
        deck.add(&CardRecord::new("Mystery"), 1).unwrap();

        let text = export_deck_text(&deck);
        let expected = "\
// Mix
// Format: modern

// Creatures
1x Ornithopter

// Instants
4x Lightning Bolt
2x Shock

// Lands
20x Mountain

// Others
1x Mystery
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_export_then_import_keeps_quantities() {
        let index = CardIndex::build(vec![
            CardRecord::new("Shock").with_type_line("Instant"),
            CardRecord::new("Mountain").with_type_line("Basic Land — Mountain"),
        ]);
        let mut deck = DeckAggregate::new("Red").with_description("Just red");
        deck.add_by_name(&index, "Shock", 4).unwrap();
        deck.add_by_name(&index, "Mountain", 18).unwrap();

        let text = export_deck_text(&deck);
        assert!(text.starts_with("// Red\n// Just red\n// Format: Not specified\n"));

        let import = import_deck_text(&text, "Red", &index);
        assert!(import.unresolved.is_empty());
        assert_eq!(import.deck.total_cards(), 22);
        assert_eq!(import.deck.find("Shock").unwrap().quantity, 4);
    }
}
