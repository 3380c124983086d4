//! Character catalog
//!
//! Cosmetic skins, each unlocked once the best score reaches its threshold.
//! The catalog is data (`assets/characters.json`), parsed once at startup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in catalog shipped with the game
const BUILTIN_CATALOG: &str = include_str!("../assets/characters.json");

/// A selectable character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDescriptor {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    /// Image path the renderer resolves to a bitmap
    #[serde(rename = "image")]
    pub image_ref: String,
    /// Best score needed before this character can be chosen
    #[serde(default)]
    pub unlock_score: u32,
    #[serde(default)]
    pub description: String,
}

impl CharacterDescriptor {
    /// Whether a player with `high_score` may pick this character
    #[inline]
    pub fn is_unlocked(&self, high_score: u32) -> bool {
        self.unlock_score <= high_score
    }
}

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed character catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("character catalog is empty")]
    Empty,
    #[error("character catalog has no starter character (unlock_score 0)")]
    NoStarter,
    #[error("duplicate character id {0:?}")]
    DuplicateId(String),
}

/// Ordered, immutable list of characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterCatalog {
    characters: Vec<CharacterDescriptor>,
}

impl CharacterCatalog {
    /// Build a catalog, checking that ids are unique and a starter exists
    pub fn new(characters: Vec<CharacterDescriptor>) -> Result<Self, CatalogError> {
        if characters.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, character) in characters.iter().enumerate() {
            if characters[..i].iter().any(|c| c.id == character.id) {
                return Err(CatalogError::DuplicateId(character.id.clone()));
            }
        }
        if !characters.iter().any(|c| c.unlock_score == 0) {
            return Err(CatalogError::NoStarter);
        }
        Ok(Self { characters })
    }

    /// Parse a catalog from a JSON array of descriptors
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let characters: Vec<CharacterDescriptor> = serde_json::from_str(json)?;
        Self::new(characters)
    }

    /// The catalog bundled with the game
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn get(&self, id: &str) -> Option<&CharacterDescriptor> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// First character that needs no unlock
    pub fn starter(&self) -> &CharacterDescriptor {
        // Construction guarantees a starter exists
        self.characters
            .iter()
            .find(|c| c.unlock_score == 0)
            .unwrap_or(&self.characters[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacterDescriptor> {
        self.characters.iter()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
