//! Deck aggregate, text format and store tests.
//!
//! These tests verify:
//! - Quantity invariants under arbitrary add/remove sequences
//! - Name resolution through the collection index
//! - Text list and EDHREC export import
//! - JSON persistence in the deck store

use deckvault::cards::{CardIndex, CardRecord};
use deckvault::deck::{
    export_deck_text, import_deck_text, import_edhrec_csv, sanitize_deck_filename, DeckAggregate,
    DeckStore, RemoveQuantity,
};
use deckvault::error::{DeckError, ImportError};
use deckvault::rules::ReconciliationEngine;
use proptest::prelude::*;
use tempfile::TempDir;

const NAMES: [&str; 5] = ["Lightning Bolt", "Shock", "Opt", "Counterspell", "Mountain"];

fn collection() -> CardIndex {
    CardIndex::build(vec![
        CardRecord::new("Rayo")
            .with_english_name("Lightning Bolt")
            .with_quantity(4)
            .with_mana_cost("{R}")
            .with_type_line("Instant")
            .with_colors(&["R"]),
        CardRecord::new("Goblin Guide")
            .with_quantity(2)
            .with_mana_cost("{R}")
            .with_type_line("Creature — Goblin Scout")
            .with_colors(&["R"]),
        CardRecord::new("Montaña")
            .with_english_name("Mountain")
            .with_quantity(30)
            .with_type_line("Basic Land — Mountain"),
    ])
}

#[derive(Clone, Debug)]
enum Op {
    Add(usize, u32),
    Remove(usize, u32),
    RemoveAll(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..NAMES.len(), 1u32..10).prop_map(|(card, qty)| Op::Add(card, qty)),
        (0..NAMES.len(), 0u32..10).prop_map(|(card, qty)| Op::Remove(card, qty)),
        (0..NAMES.len()).prop_map(Op::RemoveAll),
    ]
}

// ===== Invariants =====

proptest! {
    /// total_cards always equals the sum of entry quantities.
    #[test]
    fn prop_total_matches_sum(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut deck = DeckAggregate::new("Random");

        for op in ops {
            match op {
                Op::Add(card, qty) => deck.add(&CardRecord::new(NAMES[card]), qty).unwrap(),
                Op::Remove(card, qty) => { deck.remove(NAMES[card], qty); }
                Op::RemoveAll(card) => { deck.remove(NAMES[card], RemoveQuantity::All); }
            }

            let sum: u32 = deck.iter().map(|entry| entry.quantity).sum();
            prop_assert_eq!(deck.total_cards(), sum);
            prop_assert!(deck.iter().all(|entry| entry.quantity >= 1));
        }
    }

    /// Adding q1 then q2 is the same as adding q1 + q2 once.
    #[test]
    fn prop_add_merges(q1 in 1u32..100, q2 in 1u32..100) {
        let card = CardRecord::new("Shock");

        let mut split = DeckAggregate::new("Split");
        split.add(&card, q1).unwrap();
        split.add(&card, q2).unwrap();

        let mut once = DeckAggregate::new("Split");
        once.add(&card, q1 + q2).unwrap();

        prop_assert_eq!(split, once);
    }

    /// At most one entry per identity, whatever order names are added in.
    #[test]
    fn prop_one_entry_per_identity(picks in prop::collection::vec(0..NAMES.len(), 1..30)) {
        let mut deck = DeckAggregate::new("Unique");
        for &pick in &picks {
            deck.add(&CardRecord::new(NAMES[pick]), 1).unwrap();
        }

        let mut distinct = picks.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(deck.unique_card_count(), distinct.len());
        prop_assert_eq!(deck.total_cards() as usize, picks.len());
    }
}

/// Test removing all copies deletes the entry.
#[test]
fn test_remove_all_deletes_entry() {
    let mut deck = DeckAggregate::new("Burn");
    deck.add(&CardRecord::new("Shock"), 3).unwrap();

    assert!(deck.remove("shock", RemoveQuantity::All));
    assert!(deck.find("Shock").is_none());
    assert_eq!(deck.total_cards(), 0);
    assert!(!deck.remove("Shock", 1));
}

/// Test removing exactly the remaining copies also deletes the entry.
#[test]
fn test_remove_to_zero() {
    let mut deck = DeckAggregate::new("Burn");
    deck.add(&CardRecord::new("Shock"), 3).unwrap();

    assert!(deck.remove("Shock", 2));
    assert_eq!(deck.find("Shock").unwrap().quantity, 1);
    assert!(deck.remove("Shock", 5));
    assert!(deck.is_empty());
}

// ===== Name resolution =====

/// Test adding by either collection name resolves the same card.
#[test]
fn test_add_by_name() {
    let index = collection();
    let mut deck = DeckAggregate::new("Burn");

    deck.add_by_name(&index, "Lightning Bolt", 2).unwrap();
    deck.add_by_name(&index, "rayo", 2).unwrap();

    assert_eq!(deck.unique_card_count(), 1);
    assert_eq!(deck.find("Lightning Bolt").unwrap().quantity, 4);
}

/// Test a failed lookup leaves the deck unchanged.
#[test]
fn test_add_unknown_name_leaves_deck_unchanged() {
    let index = collection();
    let mut deck = DeckAggregate::new("Burn");
    deck.add_by_name(&index, "Goblin Guide", 4).unwrap();
    let before = deck.clone();

    let err = deck.add_by_name(&index, "Black Lotus", 1).unwrap_err();
    assert_eq!(err, DeckError::CardNotFound("Black Lotus".to_string()));
    assert_eq!(deck, before);

    assert_eq!(deck.add_by_name(&index, "Goblin Guide", 0), Err(DeckError::ZeroQuantity));
    assert_eq!(deck, before);
}

/// Test deck analysis over a small mixed deck.
#[test]
fn test_analysis() {
    let index = collection();
    let mut deck = DeckAggregate::new("Burn").with_format("modern");
    deck.add_by_name(&index, "Lightning Bolt", 4).unwrap();
    deck.add_by_name(&index, "Goblin Guide", 4).unwrap();
    deck.add_by_name(&index, "Mountain", 12).unwrap();

    let analysis = deck.analyze();
    assert_eq!(analysis.total_cards, 20);
    assert_eq!(analysis.unique_cards, 3);
    assert_eq!(analysis.color_distribution.get("R"), Some(&8));
    assert_eq!(analysis.mana_curve.get(&1), Some(&8));
    assert_eq!(analysis.mana_curve.get(&0), Some(&12));
    assert_eq!(analysis.type_distribution.get("Land"), Some(&12));
    assert_eq!(analysis.entries_per_group.get("Creature"), Some(&1));
    assert_eq!(deck.cards_of_type("instant").count(), 1);
}

// ===== Text format =====

/// Test importing a text list reports unresolved lines.
#[test]
fn test_import_text() {
    let index = collection();
    let text = "// Burn\n4 Lightning Bolt\n4x Goblin Guide\n2 Black Lotus\n12 Mountain\n";

    let import = import_deck_text(text, "Burn", &index);

    assert_eq!(import.deck.total_cards(), 20);
    assert_eq!(import.unresolved.len(), 1);
    assert_eq!(import.unresolved[0].name, "Black Lotus");
    assert_eq!(import.unresolved[0].quantity, 2);
}

/// Test an exported list imports back to the same deck.
#[test]
fn test_export_then_import() {
    let index = collection();
    let mut deck = DeckAggregate::new("Burn").with_format("modern");
    deck.add_by_name(&index, "Mountain", 12).unwrap();
    deck.add_by_name(&index, "Goblin Guide", 4).unwrap();
    deck.add_by_name(&index, "Lightning Bolt", 4).unwrap();

    let text = export_deck_text(&deck);
    assert!(text.starts_with("// Burn\n// Format: modern\n\n// Creatures\n4x Goblin Guide\n"));

    let import = import_deck_text(&text, "Burn", &index);
    assert!(import.unresolved.is_empty());
    assert_eq!(import.deck.total_cards(), deck.total_cards());
    for entry in deck.iter() {
        assert_eq!(import.deck.find(entry.name()).unwrap().quantity, entry.quantity);
    }
}

// ===== EDHREC exports =====

/// Test an EDHREC export on disk reconciles against the collection.
#[test]
fn test_edhrec_export_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("burn.csv");
    std::fs::write(
        &path,
        "Card Name,Category\nLightning Bolt,Instants\nLightning Bolt,Instants\n\
         Goblin Guide,Creatures\nMountain,Lands\nMountain,Lands\nMountain,Lands\n\
         Eidolon of the Great Revel,Creatures\n",
    )
    .unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let import = import_edhrec_csv(file, "Burn", &collection()).unwrap();

    assert_eq!(import.deck.total_cards(), 6);
    assert_eq!(import.deck.find("Mountain").unwrap().quantity, 3);
    assert_eq!(import.unresolved.len(), 1);
    assert_eq!(import.unresolved[0].name, "Eidolon of the Great Revel");

    let result = ReconciliationEngine::compare(&import.deck, &collection());
    assert!(result.is_complete());
}

/// Test an export without a name column is a typed error.
#[test]
fn test_edhrec_export_without_name_column() {
    let data = "Quantity,Type\n1,Instant\n";
    let result = import_edhrec_csv(data.as_bytes(), "Broken", &collection());

    assert!(matches!(result, Err(ImportError::MissingNameColumn { .. })));
}

// ===== Overflow =====

/// Test a deck at the copy ceiling rejects more cards without changing.
#[test]
fn test_add_past_ceiling_is_rejected() {
    let mut deck = DeckAggregate::new("Huge");
    deck.add(&CardRecord::new("Relentless Rats"), u32::MAX).unwrap();

    assert_eq!(
        deck.add(&CardRecord::new("Shock"), 1),
        Err(DeckError::QuantityOverflow)
    );
    assert_eq!(deck.unique_card_count(), 1);
    assert_eq!(deck.total_cards(), u32::MAX);
}

// ===== Store =====

/// Test saving then loading preserves the deck.
#[test]
fn test_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = DeckStore::new(dir.path().join("decks"));
    let index = collection();

    let mut deck = DeckAggregate::new("Mono Red: Burn!")
        .with_format("modern")
        .with_description("Go face");
    deck.add_by_name(&index, "Lightning Bolt", 4).unwrap();
    deck.add_by_name(&index, "Mountain", 16).unwrap();

    let path = store.save(&deck).unwrap();
    assert!(path.ends_with("Mono-Red_-Burn_.json"));

    let loaded = store.load("Mono-Red_-Burn_.json").unwrap().unwrap();
    assert_eq!(loaded.name, deck.name);
    assert_eq!(loaded.format.as_deref(), Some("modern"));
    assert_eq!(loaded.description.as_deref(), Some("Go face"));
    assert_eq!(loaded.total_cards(), 20);
    assert_eq!(loaded.find("Rayo").unwrap().quantity, 4);
    assert_eq!(
        loaded.find("Lightning Bolt").unwrap().card.mana_cost.as_deref(),
        Some("{R}")
    );
}

/// Test listing and deleting stored decks.
#[test]
fn test_store_list_and_delete() {
    let dir = TempDir::new().unwrap();
    let store = DeckStore::new(dir.path());

    assert!(store.list().unwrap().is_empty());

    let mut burn = DeckAggregate::new("Burn").with_format("modern");
    burn.add(&CardRecord::new("Shock"), 4).unwrap();
    let mut control = DeckAggregate::new("Control");
    control.add(&CardRecord::new("Opt"), 4).unwrap();
    control.add(&CardRecord::new("Counterspell"), 4).unwrap();

    store.save(&burn).unwrap();
    store.save(&control).unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

    let summaries = store.list().unwrap();
    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Burn", "Control"]);
    assert_eq!(summaries[0].format.as_deref(), Some("modern"));
    assert_eq!(summaries[1].card_count, 2);

    assert!(store.delete("Burn.json").unwrap());
    assert!(!store.delete("Burn.json").unwrap());
    assert!(store.load("Burn.json").unwrap().is_none());
    assert_eq!(store.list().unwrap().len(), 1);
}

/// Test a malformed deck file is an error on direct load.
#[test]
fn test_store_malformed_load() {
    let dir = TempDir::new().unwrap();
    let store = DeckStore::new(dir.path());
    std::fs::write(dir.path().join("broken.json"), "[1, 2").unwrap();

    assert!(store.load("broken.json").is_err());
}

/// Test filename sanitizing.
#[test]
fn test_sanitize_filename() {
    assert_eq!(sanitize_deck_filename("Burn"), "Burn");
    assert_eq!(sanitize_deck_filename("Mono Red: Burn!"), "Mono-Red_-Burn_");
    assert_eq!(sanitize_deck_filename("a/b\\c"), "a_b_c");
}
