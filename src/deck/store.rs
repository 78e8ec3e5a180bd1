//! JSON deck files, one per deck.
//!
//! File names come from [`sanitize_deck_filename`] applied to the deck name,
//! plus a `.json` extension.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::aggregate::{DeckAggregate, DeckFile};
use crate::config::DataConfig;
use crate::error::{StoreError, StoreResult};

/// Listing entry for a stored deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSummary {
    pub name: String,
    pub format: Option<String>,
    /// Number of distinct cards.
    pub card_count: usize,
    pub file_name: String,
}

/// Directory of saved decks.
#[derive(Clone, Debug)]
pub struct DeckStore {
    dir: PathBuf,
}

impl DeckStore {
    /// Store rooted at `dir` (created on first save).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(config.decks_dir.clone())
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name a deck is saved under.
    #[must_use]
    pub fn file_name_for(deck: &DeckAggregate) -> String {
        format!("{}.json", sanitize_deck_filename(&deck.name))
    }

    /// Write a deck as pretty JSON, replacing any previous save.
    pub fn save(&self, deck: &DeckAggregate) -> StoreResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(Self::file_name_for(deck));
        let json = serde_json::to_string_pretty(deck)?;
        fs::write(&path, json).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Saved deck {:?} to {}", deck.name, path.display());
        Ok(path)
    }

    /// Load a deck by file name. A missing file is `Ok(None)`.
    pub fn load(&self, file_name: &str) -> StoreResult<Option<DeckAggregate>> {
        let path = self.dir.join(file_name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Malformed { path, source })
    }

    /// Summaries of every readable deck file, sorted by file name.
    ///
    /// Unreadable files are skipped with a warning. A missing directory lists
    /// as empty.
    pub fn list(&self) -> StoreResult<Vec<DeckSummary>> {
        let dir_entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut summaries = Vec::new();
        for dir_entry in dir_entries.flatten() {
            let path = dir_entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str::<DeckFile>(&s).map_err(|e| e.to_string()));
            match parsed {
                Ok(file) => summaries.push(file.summary(file_name)),
                Err(err) => warn!("Skipping unreadable deck {}: {}", path.display(), err),
            }
        }

        summaries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(summaries)
    }

    /// Delete a deck file. Returns whether it existed.
    pub fn delete(&self, file_name: &str) -> StoreResult<bool> {
        let path = self.dir.join(file_name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted deck file {}", path.display());
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

impl DeckFile {
    fn summary(&self, file_name: &str) -> DeckSummary {
        DeckSummary {
            name: if self.name.is_empty() {
                "Unnamed".to_string()
            } else {
                self.name.clone()
            },
            format: self.format.clone(),
            card_count: self.cards.len(),
            file_name: file_name.to_string(),
        }
    }
}

/// Turn a deck name into a safe file stem.
///
/// Characters other than alphanumerics, space, hyphen and underscore become
/// `_`; the result is trimmed, runs of spaces collapse, and spaces become
/// hyphens.
///
/// ```
/// use deckvault::deck::sanitize_deck_filename;
///
/// assert_eq!(sanitize_deck_filename("  Mono Red: Burn!  "), "Mono-Red_-Burn_");
/// ```
#[must_use]
pub fn sanitize_deck_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_deck_filename("Burn"), "Burn");
        assert_eq!(sanitize_deck_filename("Mono  Red   Burn"), "Mono-Red-Burn");
        assert_eq!(sanitize_deck_filename("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_deck_filename("Ñoño_deck-1"), "Ñoño_deck-1");
        assert_eq!(sanitize_deck_filename("   "), "");
    }

    #[test]
    fn test_file_name_for() {
        let deck = DeckAggregate::new("Elves? Yes!");
        assert_eq!(DeckStore::file_name_for(&deck), "Elves_-Yes_.json");
    }
}
