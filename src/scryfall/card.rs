//! Card payloads returned by the metadata API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::{CardRecord, ColorSet};

/// Image sizes offered by the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    Small,
    #[default]
    Normal,
    Large,
    Png,
    ArtCrop,
    BorderCrop,
}

impl ImageSize {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::Small => "small",
            ImageSize::Normal => "normal",
            ImageSize::Large => "large",
            ImageSize::Png => "png",
            ImageSize::ArtCrop => "art_crop",
            ImageSize::BorderCrop => "border_crop",
        }
    }
}

/// Sizes tried after the preferred one, in order.
const FALLBACK_SIZES: [ImageSize; 4] = [
    ImageSize::Normal,
    ImageSize::Large,
    ImageSize::Small,
    ImageSize::Png,
];

/// One face of a multi-faced card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardFace {
    pub name: String,
    pub mana_cost: Option<String>,
    pub type_line: Option<String>,
    pub oracle_text: Option<String>,
    pub image_uris: BTreeMap<String, String>,
}

/// A card as returned by the metadata API.
///
/// Unknown fields are ignored; every known field is optional on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScryfallCard {
    pub id: String,
    pub name: String,
    pub mana_cost: Option<String>,
    pub type_line: Option<String>,
    pub oracle_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub colors: Vec<String>,
    pub color_identity: Vec<String>,
    pub rarity: Option<String>,
    pub set: Option<String>,
    pub collector_number: Option<String>,
    pub image_uris: BTreeMap<String, String>,
    pub card_faces: Vec<CardFace>,
}

impl ScryfallCard {
    /// Image URL for `preferred`, falling back through the other sizes and
    /// then to the front face (double-faced cards carry no top-level images).
    #[must_use]
    pub fn image_url(&self, preferred: ImageSize) -> Option<&str> {
        pick_image(&self.image_uris, preferred).or_else(|| {
            self.card_faces
                .first()
                .and_then(|face| pick_image(&face.image_uris, preferred))
        })
    }

    /// English name: the card name, else the front face's name.
    #[must_use]
    pub fn english_name(&self) -> Option<&str> {
        if !self.name.is_empty() {
            return Some(&self.name);
        }
        self.card_faces
            .first()
            .map(|face| face.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Build a collection record from this card, owning `quantity` copies.
    #[must_use]
    pub fn to_record(&self, quantity: u32) -> CardRecord {
        let name = self.english_name().unwrap_or_default();
        let front = self.card_faces.first();
        let mut record = CardRecord::new(name)
            .with_english_name(name)
            .with_quantity(quantity);

        record.colors = self.colors.iter().cloned().collect::<ColorSet>();
        record.color_identity = self.color_identity.iter().cloned().collect::<ColorSet>();
        record.scryfall_uuid = non_empty(&self.id);
        record.mana_cost = self
            .mana_cost
            .clone()
            .or_else(|| front.and_then(|face| face.mana_cost.clone()));
        record.type_line = self
            .type_line
            .clone()
            .or_else(|| front.and_then(|face| face.type_line.clone()));
        record.oracle_text = self
            .oracle_text
            .clone()
            .or_else(|| front.and_then(|face| face.oracle_text.clone()));
        record.power = self.power.clone();
        record.toughness = self.toughness.clone();
        record.rarity = self.rarity.clone();
        record.set_code = self.set.as_deref().map(str::to_uppercase);
        record.collector_number = self.collector_number.clone();
        record.image_url = self.image_url(ImageSize::Normal).map(str::to_string);
        record
    }
}

fn pick_image(uris: &BTreeMap<String, String>, preferred: ImageSize) -> Option<&str> {
    std::iter::once(preferred)
        .chain(FALLBACK_SIZES)
        .find_map(|size| uris.get(size.as_str()))
        .map(String::as_str)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
