//! Card records - one row of the owned collection.
//!
//! A `CardRecord` is immutable once loaded. It carries a primary name
//! (usually the localized printed name), an optional alternate name
//! (usually the English name), the owned quantity, and descriptive
//! attributes used for searching and deck statistics.
//!
//! Two records have the same *identity* when any of their names match
//! case-insensitively.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Set of color symbols (`W`, `U`, `B`, `R`, `G`, ...).
///
/// Almost every card has at most five colors, so this never spills to the heap.
pub type ColorSet = SmallVec<[String; 5]>;

/// Mana symbols counted by the simplified converted-mana-cost rule.
const COLORED_MANA: [char; 5] = ['W', 'U', 'B', 'R', 'G'];

/// Words skipped when listing card types.
pub(crate) const SUPERTYPES: [&str; 3] = ["Legendary", "Basic", "Snow"];

/// A card from the collection.
///
/// ## Example
///
/// ```
/// use deckvault::cards::CardRecord;
///
/// let angel = CardRecord::new("Ángel de Serra")
///     .with_english_name("Serra Angel")
///     .with_mana_cost("{3}{W}{W}")
///     .with_type_line("Creature — Angel")
///     .with_quantity(2);
///
/// assert_eq!(angel.display_name(), "Serra Angel");
/// assert_eq!(angel.converted_mana_cost(), 5);
/// assert_eq!(angel.main_type(), Some("Creature"));
/// assert!(angel.matches_name("serra angel"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    /// Primary name.
    pub card_name: String,

    /// Alternate (English) name.
    #[serde(default)]
    pub english_card_name: Option<String>,

    /// Owned copies (or, inside a saved deck, copies in the deck).
    #[serde(default)]
    pub quantity: u32,

    /// External identifier at the card metadata API.
    #[serde(default)]
    pub scryfall_uuid: Option<String>,

    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,

    #[serde(default)]
    pub colors: ColorSet,
    #[serde(default)]
    pub color_identity: ColorSet,

    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub set_code: Option<String>,
    #[serde(default)]
    pub collector_number: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CardRecord {
    /// Create a record with only a primary name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            card_name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_english_name(mut self, name: impl Into<String>) -> Self {
        self.english_card_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    #[must_use]
    pub fn with_mana_cost(mut self, cost: impl Into<String>) -> Self {
        self.mana_cost = Some(cost.into());
        self
    }

    #[must_use]
    pub fn with_type_line(mut self, type_line: impl Into<String>) -> Self {
        self.type_line = Some(type_line.into());
        self
    }

    /// Set both colors and color identity.
    #[must_use]
    pub fn with_colors(mut self, colors: &[&str]) -> Self {
        self.colors = colors.iter().map(|c| (*c).to_string()).collect();
        self.color_identity = self.colors.clone();
        self
    }

    /// Set the color identity only (e.g. lands with colored abilities).
    #[must_use]
    pub fn with_color_identity(mut self, colors: &[&str]) -> Self {
        self.color_identity = colors.iter().map(|c| (*c).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_rarity(mut self, rarity: impl Into<String>) -> Self {
        self.rarity = Some(rarity.into());
        self
    }

    #[must_use]
    pub fn with_set_code(mut self, set_code: impl Into<String>) -> Self {
        self.set_code = Some(set_code.into());
        self
    }

    #[must_use]
    pub fn with_scryfall_uuid(mut self, id: impl Into<String>) -> Self {
        self.scryfall_uuid = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Name shown in the interface: the alternate name if present.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.english_card_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.card_name)
    }

    /// Every non-empty name of this card (primary first).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.card_name.as_str())
            .chain(self.english_card_name.as_deref())
            .filter(|n| !n.is_empty())
    }

    /// Case-insensitive match against either name.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.names().any(|n| n.to_lowercase() == wanted)
    }

    /// True if the two records share any name (case-insensitively).
    #[must_use]
    pub fn same_identity(&self, other: &CardRecord) -> bool {
        other.names().any(|n| self.matches_name(n))
    }

    /// Case-insensitive substring match against either name.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub(crate) fn name_contains(&self, needle: &str) -> bool {
        self.names().any(|n| n.to_lowercase().contains(needle))
    }

    /// Simplified converted mana cost.
    ///
    /// Sums every number in the cost and adds one per colored symbol:
    /// `{3}{W}{W}` is 5, `{X}{R}` is 1.
    #[must_use]
    pub fn converted_mana_cost(&self) -> u32 {
        let Some(cost) = self.mana_cost.as_deref() else {
            return 0;
        };

        let mut total = 0u32;
        let mut number: Option<u32> = None;
        for ch in cost.chars() {
            if let Some(digit) = ch.to_digit(10) {
                number = Some(number.unwrap_or(0).saturating_mul(10).saturating_add(digit));
                continue;
            }
            if let Some(n) = number.take() {
                total = total.saturating_add(n);
            }
            if COLORED_MANA.contains(&ch) {
                total = total.saturating_add(1);
            }
        }
        total.saturating_add(number.unwrap_or(0))
    }

    /// Words of the type line before the subtype separator.
    pub fn type_words(&self) -> impl Iterator<Item = &str> {
        self.type_line
            .as_deref()
            .and_then(|t| t.split('—').next())
            .unwrap_or("")
            .split_whitespace()
    }

    /// Main type: the last word before the subtype separator.
    ///
    /// `Legendary Creature — Elf` is `Creature`.
    #[must_use]
    pub fn main_type(&self) -> Option<&str> {
        self.type_words().last()
    }

    /// Case-insensitive substring match on the type line.
    #[must_use]
    pub fn has_type(&self, card_type: &str) -> bool {
        self.type_line
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(&card_type.to_lowercase()))
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.type_line.as_deref().is_some_and(|t| t.contains("Creature"))
    }

    /// Basic lands are exempt from copy limits.
    #[must_use]
    pub fn is_basic_land(&self) -> bool {
        self.type_line
            .as_deref()
            .is_some_and(|t| t.contains("Basic") && t.contains("Land"))
    }

    /// True if the color identity contains any of `colors`.
    #[must_use]
    pub fn shares_color_identity<S: AsRef<str>>(&self, colors: &[S]) -> bool {
        colors.iter().any(|wanted| {
            self.color_identity
                .iter()
                .any(|c| c.eq_ignore_ascii_case(wanted.as_ref()))
        })
    }

    /// Exact, case-insensitive rarity match.
    #[must_use]
    pub fn has_rarity(&self, rarity: &str) -> bool {
        self.rarity
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(rarity))
    }

    /// Exact, case-insensitive set code match.
    #[must_use]
    pub fn in_set(&self, set_code: &str) -> bool {
        self.set_code
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(set_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_english() {
        let card = CardRecord::new("Rayo").with_english_name("Lightning Bolt");
        assert_eq!(card.display_name(), "Lightning Bolt");

        let card = CardRecord::new("Lightning Bolt");
        assert_eq!(card.display_name(), "Lightning Bolt");

        let card = CardRecord::new("Rayo").with_english_name("");
        assert_eq!(card.display_name(), "Rayo");
    }

    #[test]
    fn test_name_matching() {
        let card = CardRecord::new("Rayo").with_english_name("Lightning Bolt");

        assert!(card.matches_name("rayo"));
        assert!(card.matches_name("LIGHTNING BOLT"));
        assert!(!card.matches_name("Lightning"));

        let other = CardRecord::new("lightning bolt");
        assert!(card.same_identity(&other));
        assert!(other.same_identity(&card));
        assert!(!card.same_identity(&CardRecord::new("Shock")));
    }

    #[test]
    fn test_non_ascii_names_match_case_insensitively() {
        let card = CardRecord::new("Ángel de Serra");
        assert!(card.matches_name("ángel de serra"));
        assert!(card.name_contains("ángel"));
    }

    #[test]
    fn test_converted_mana_cost() {
        assert_eq!(CardRecord::new("a").with_mana_cost("{3}{W}{W}").converted_mana_cost(), 5);
        assert_eq!(CardRecord::new("b").with_mana_cost("{R}").converted_mana_cost(), 1);
        assert_eq!(CardRecord::new("c").with_mana_cost("{0}").converted_mana_cost(), 0);
        assert_eq!(CardRecord::new("d").with_mana_cost("{10}{G}").converted_mana_cost(), 11);
        assert_eq!(CardRecord::new("e").with_mana_cost("{X}{R}").converted_mana_cost(), 1);
        assert_eq!(CardRecord::new("f").converted_mana_cost(), 0);
    }

    #[test]
    fn test_main_type() {
        let angel = CardRecord::new("a").with_type_line("Creature — Angel");
        assert_eq!(angel.main_type(), Some("Creature"));

        let elf = CardRecord::new("b").with_type_line("Legendary Creature — Elf Druid");
        assert_eq!(elf.main_type(), Some("Creature"));

        let forest = CardRecord::new("c").with_type_line("Basic Land — Forest");
        assert_eq!(forest.main_type(), Some("Land"));
        assert!(forest.is_basic_land());
        assert!(!angel.is_basic_land());

        assert_eq!(CardRecord::new("d").main_type(), None);
    }

    #[test]
    fn test_filters() {
        let card = CardRecord::new("Lightning Helix")
            .with_colors(&["R", "W"])
            .with_type_line("Instant")
            .with_rarity("Uncommon")
            .with_set_code("RAV");

        assert!(card.shares_color_identity(&["W"]));
        assert!(card.shares_color_identity(&["u", "r"]));
        assert!(!card.shares_color_identity(&["G"]));
        assert!(!card.shares_color_identity::<&str>(&[]));

        assert!(card.has_type("instant"));
        assert!(!card.has_type("Creature"));
        assert!(card.has_rarity("uncommon"));
        assert!(!card.has_rarity("un"));
        assert!(card.in_set("rav"));
    }

    #[test]
    fn test_serialization_defaults() {
        let card: CardRecord =
            serde_json::from_str(r#"{"card_name": "Forest", "quantity": 3}"#).unwrap();
        assert_eq!(card.card_name, "Forest");
        assert_eq!(card.quantity, 3);
        assert!(card.colors.is_empty());
        assert_eq!(card.english_card_name, None);
    }
}
