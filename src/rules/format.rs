//! Format legality rules.
//!
//! Rules live in a static table keyed by case-insensitive format name.
//! Validation produces one error per violated constraint, and one error per
//! over-limit card, so a caller can list every offending card.

use serde::{Deserialize, Serialize};

use crate::deck::DeckAggregate;

/// Deck size constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardCount {
    AtLeast(u32),
    Exactly(u32),
}

/// Construction rules for one format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatRule {
    /// Display name used in messages.
    pub name: &'static str,
    /// Lower-case names that select this rule.
    pub aliases: &'static [&'static str],
    pub card_count: CardCount,
    /// Warn (but do not fail) above this many cards.
    pub warn_above: Option<u32>,
    /// Maximum copies of any one card.
    pub copy_limit: Option<u32>,
    /// Basic lands ignore `copy_limit`.
    pub basic_lands_exempt: bool,
}

/// All known formats.
pub const FORMAT_RULES: [FormatRule; 3] = [
    FormatRule {
        name: "Standard",
        aliases: &["standard"],
        card_count: CardCount::AtLeast(60),
        warn_above: Some(60),
        copy_limit: None,
        basic_lands_exempt: false,
    },
    FormatRule {
        name: "Modern",
        aliases: &["modern"],
        card_count: CardCount::AtLeast(60),
        warn_above: None,
        copy_limit: Some(4),
        basic_lands_exempt: true,
    },
    FormatRule {
        name: "Commander",
        aliases: &["commander", "edh"],
        card_count: CardCount::Exactly(100),
        warn_above: None,
        copy_limit: Some(1),
        basic_lands_exempt: true,
    },
];

/// Look up the rule for a format name (case-insensitive, surrounding
/// whitespace ignored).
#[must_use]
pub fn rule_for(format: &str) -> Option<&'static FormatRule> {
    let wanted = format.trim().to_lowercase();
    FORMAT_RULES
        .iter()
        .find(|rule| rule.aliases.contains(&wanted.as_str()))
}

/// Validation outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validates decks against format rules.
pub struct FormatValidator;

impl FormatValidator {
    /// Validate a deck against its own `format` field.
    #[must_use]
    pub fn validate(deck: &DeckAggregate) -> ValidationReport {
        Self::validate_as(deck, deck.format.as_deref())
    }

    /// Validate a deck against an explicit format (or none).
    ///
    /// The name and non-empty checks always run; unknown formats add nothing.
    #[must_use]
    pub fn validate_as(deck: &DeckAggregate, format: Option<&str>) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if deck.name.trim().is_empty() {
            errors.push("Deck must have a name".to_string());
        }
        if deck.total_cards() == 0 {
            errors.push("Deck cannot be empty".to_string());
        }

        if let Some(rule) = format.and_then(rule_for) {
            apply_rule(rule, deck, &mut errors, &mut warnings);
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// True iff `format` is known and the deck passes it.
    #[must_use]
    pub fn is_legal(deck: &DeckAggregate, format: &str) -> bool {
        rule_for(format).is_some() && Self::validate_as(deck, Some(format)).valid
    }
}

fn apply_rule(
    rule: &FormatRule,
    deck: &DeckAggregate,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let total = deck.total_cards();
    match rule.card_count {
        CardCount::AtLeast(min) if total < min => errors.push(format!(
            "{} requires at least {} cards (deck has {})",
            rule.name, min, total
        )),
        CardCount::Exactly(exact) if total != exact => errors.push(format!(
            "{} requires exactly {} cards (deck has {})",
            rule.name, exact, total
        )),
        _ => {}
    }

    if let Some(limit) = rule.warn_above {
        if total > limit {
            warnings.push(format!(
                "{} decks usually have exactly {} cards (deck has {})",
                rule.name, limit, total
            ));
        }
    }

    if let Some(limit) = rule.copy_limit {
        for entry in deck.iter() {
            if entry.quantity <= limit || (rule.basic_lands_exempt && entry.card.is_basic_land()) {
                continue;
            }
            errors.push(format!(
                "{} allows at most {} {} of {} (deck has {})",
                rule.name,
                limit,
                if limit == 1 { "copy" } else { "copies" },
                entry.name(),
                entry.quantity
            ));
        }
    }
}
