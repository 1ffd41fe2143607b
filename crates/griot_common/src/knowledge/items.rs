//! Cultural record types.
//!
//! Records are immutable once loaded and owned by the stores for the
//! process lifetime.

use serde::{Deserialize, Serialize};

/// Category of a cultural record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Festival,
    ArtForm,
    Tradition,
    Language,
    Proverb,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Festival => "festival",
            ItemKind::ArtForm => "art_form",
            ItemKind::Tradition => "tradition",
            ItemKind::Language => "language",
            ItemKind::Proverb => "proverb",
        }
    }

    /// Fixed category order used when grouping and scanning records
    pub fn all() -> [ItemKind; 5] {
        [
            ItemKind::Festival,
            ItemKind::ArtForm,
            ItemKind::Tradition,
            ItemKind::Language,
            ItemKind::Proverb,
        ]
    }
}

/// A single cultural-heritage record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CulturalItem {
    Festival {
        name: String,
        culture: String,
        description: String,
        season: String,
        location: String,
    },
    ArtForm {
        name: String,
        culture: String,
        description: String,
        techniques: Vec<String>,
        materials: Vec<String>,
    },
    Tradition {
        name: String,
        culture: String,
        description: String,
        occasion: String,
    },
    Language {
        name: String,
        culture: String,
        description: String,
        region: String,
        speakers: String,
    },
    Proverb {
        /// Short label used when listing proverbs
        name: String,
        culture: String,
        text: String,
        meaning: String,
    },
}

impl CulturalItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            CulturalItem::Festival { .. } => ItemKind::Festival,
            CulturalItem::ArtForm { .. } => ItemKind::ArtForm,
            CulturalItem::Tradition { .. } => ItemKind::Tradition,
            CulturalItem::Language { .. } => ItemKind::Language,
            CulturalItem::Proverb { .. } => ItemKind::Proverb,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CulturalItem::Festival { name, .. }
            | CulturalItem::ArtForm { name, .. }
            | CulturalItem::Tradition { name, .. }
            | CulturalItem::Language { name, .. }
            | CulturalItem::Proverb { name, .. } => name,
        }
    }

    pub fn culture(&self) -> &str {
        match self {
            CulturalItem::Festival { culture, .. }
            | CulturalItem::ArtForm { culture, .. }
            | CulturalItem::Tradition { culture, .. }
            | CulturalItem::Language { culture, .. }
            | CulturalItem::Proverb { culture, .. } => culture,
        }
    }

    /// Primary prose for the record: the description, or the proverb text
    /// with its meaning.
    pub fn summary(&self) -> String {
        match self {
            CulturalItem::Festival { description, .. }
            | CulturalItem::ArtForm { description, .. }
            | CulturalItem::Tradition { description, .. }
            | CulturalItem::Language { description, .. } => description.clone(),
            CulturalItem::Proverb { text, meaning, .. } => {
                format!("\"{}\" — {}", text, meaning)
            }
        }
    }

    /// Lower-cased concatenation of every field, used for substring
    /// matching by the reasoning engine.
    pub fn search_blob(&self) -> String {
        let blob = match self {
            CulturalItem::Festival {
                name,
                culture,
                description,
                season,
                location,
            } => format!("{} {} {} {} {}", name, culture, description, season, location),
            CulturalItem::ArtForm {
                name,
                culture,
                description,
                techniques,
                materials,
            } => format!(
                "{} {} {} {} {}",
                name,
                culture,
                description,
                techniques.join(" "),
                materials.join(" ")
            ),
            CulturalItem::Tradition {
                name,
                culture,
                description,
                occasion,
            } => format!("{} {} {} {}", name, culture, description, occasion),
            CulturalItem::Language {
                name,
                culture,
                description,
                region,
                speakers,
            } => format!("{} {} {} {} {}", name, culture, description, region, speakers),
            CulturalItem::Proverb {
                name,
                culture,
                text,
                meaning,
            } => format!("{} {} {} {}", name, culture, text, meaning),
        };
        blob.to_lowercase()
    }

    /// Identity used when de-duplicating merged context: proverbs are keyed
    /// by their text, everything else by name.
    pub fn dedup_key(&self) -> (ItemKind, String) {
        let key = match self {
            CulturalItem::Proverb { text, .. } => text.to_lowercase(),
            other => other.name().to_lowercase(),
        };
        (self.kind(), key)
    }
}
