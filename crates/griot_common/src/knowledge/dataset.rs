//! Builtin cultural-heritage dataset.
//!
//! Loaded once at startup; records are read-only for the process lifetime.

use super::items::CulturalItem;
use anyhow::{Context, Result};
use tracing::info;

/// Parse a dataset from its JSON form (an array of tagged records)
pub fn from_json_str(raw: &str) -> Result<Vec<CulturalItem>> {
    serde_json::from_str(raw).context("Failed to parse cultural dataset")
}

/// Load a dataset file, replacing the builtin records
pub fn load_path(path: &str) -> Result<Vec<CulturalItem>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file {}", path))?;
    let items = from_json_str(&raw)?;
    info!("Loaded {} cultural records from {}", items.len(), path);
    Ok(items)
}

/// The static record set shipped with the engine
pub fn builtin() -> Vec<CulturalItem> {
    let mut items = Vec::new();

    // Festivals
    items.push(CulturalItem::Festival {
        name: "Sango Festival".to_string(),
        culture: "Yoruba".to_string(),
        description: "Annual festival honouring Sango, the Yoruba deity of thunder and \
                      lightning, with drumming, dance and fire displays at the royal \
                      palace of Oyo."
            .to_string(),
        season: "August".to_string(),
        location: "Oyo, Nigeria".to_string(),
    });
    items.push(CulturalItem::Festival {
        name: "Argungu Fishing Festival".to_string(),
        culture: "Hausa".to_string(),
        description: "Four-day festival on the Matan Fada river where thousands of \
                      fishermen compete bare-handed for the largest catch."
            .to_string(),
        season: "February".to_string(),
        location: "Argungu, Kebbi State, Nigeria".to_string(),
    });
    items.push(CulturalItem::Festival {
        name: "New Yam Festival".to_string(),
        culture: "Igbo".to_string(),
        description: "Harvest celebration marking the end of the farming cycle; the \
                      first yams are offered to ancestors before the community eats."
            .to_string(),
        season: "August".to_string(),
        location: "Southeastern Nigeria".to_string(),
    });
    items.push(CulturalItem::Festival {
        name: "Timkat".to_string(),
        culture: "Amhara".to_string(),
        description: "Epiphany celebration with processions of the Tabot, colourful \
                      umbrellas and ritual bathing commemorating the baptism of Jesus."
            .to_string(),
        season: "January".to_string(),
        location: "Gondar and across Ethiopia".to_string(),
    });
    items.push(CulturalItem::Festival {
        name: "Umhlanga Reed Dance".to_string(),
        culture: "Zulu".to_string(),
        description: "Ceremony where thousands of young women present cut reeds to the \
                      royal household, celebrating unity and womanhood."
            .to_string(),
        season: "September".to_string(),
        location: "KwaZulu-Natal and eSwatini".to_string(),
    });

    // Art forms
    items.push(CulturalItem::ArtForm {
        name: "Adire".to_string(),
        culture: "Yoruba".to_string(),
        description: "Indigo resist-dyed cotton textile produced by Yoruba women, with \
                      patterns drawn in cassava starch or tied before dyeing."
            .to_string(),
        techniques: vec![
            "resist dyeing".to_string(),
            "starch painting".to_string(),
            "tie and stitch".to_string(),
        ],
        materials: vec![
            "cotton cloth".to_string(),
            "indigo dye".to_string(),
            "cassava starch".to_string(),
        ],
    });
    items.push(CulturalItem::ArtForm {
        name: "Uli".to_string(),
        culture: "Igbo".to_string(),
        description: "Curvilinear body and wall painting tradition of Igbo women, built \
                      from fine freehand lines and abstract motifs."
            .to_string(),
        techniques: vec!["freehand line drawing".to_string()],
        materials: vec!["natural pigments".to_string(), "uli seed dye".to_string()],
    });
    items.push(CulturalItem::ArtForm {
        name: "Zulu Beadwork".to_string(),
        culture: "Zulu".to_string(),
        description: "Coded bead panels whose colours and geometry carry messages about \
                      courtship, status and belonging."
            .to_string(),
        techniques: vec!["bead weaving".to_string(), "colour coding".to_string()],
        materials: vec!["glass beads".to_string(), "cotton thread".to_string()],
    });
    items.push(CulturalItem::ArtForm {
        name: "Hausa Leatherwork".to_string(),
        culture: "Hausa".to_string(),
        description: "Tanned and embossed goatskin goods from Kano, historically traded \
                      across the Sahara as 'Morocco leather'."
            .to_string(),
        techniques: vec!["tanning".to_string(), "embossing".to_string()],
        materials: vec!["goatskin".to_string(), "vegetable dyes".to_string()],
    });

    // Traditions
    items.push(CulturalItem::Tradition {
        name: "Oriki Praise Poetry".to_string(),
        culture: "Yoruba".to_string(),
        description: "Recited lineage praise names that record a family's history and \
                      character, performed at naming ceremonies and celebrations."
            .to_string(),
        occasion: "naming ceremonies and celebrations".to_string(),
    });
    items.push(CulturalItem::Tradition {
        name: "Kola Nut Ceremony".to_string(),
        culture: "Igbo".to_string(),
        description: "Ritual breaking and sharing of the kola nut to welcome guests; \
                      'he who brings kola brings life'."
            .to_string(),
        occasion: "welcoming guests and opening gatherings".to_string(),
    });
    items.push(CulturalItem::Tradition {
        name: "Imbeleko".to_string(),
        culture: "Zulu".to_string(),
        description: "Ceremony introducing a newborn to the ancestors through the \
                      slaughter of a goat and the burying of the umbilical cord."
            .to_string(),
        occasion: "birth of a child".to_string(),
    });

    // Languages
    items.push(CulturalItem::Language {
        name: "Yoruba".to_string(),
        culture: "Yoruba".to_string(),
        description: "Tonal Niger-Congo language with a rich oral literature of \
                      proverbs, praise poetry and Ifa divination verses."
            .to_string(),
        region: "Southwestern Nigeria and Benin".to_string(),
        speakers: "over 45 million".to_string(),
    });
    items.push(CulturalItem::Language {
        name: "Igbo".to_string(),
        culture: "Igbo".to_string(),
        description: "Tonal language of southeastern Nigeria with many dialects and a \
                      proverb-dense rhetorical style."
            .to_string(),
        region: "Southeastern Nigeria".to_string(),
        speakers: "about 30 million".to_string(),
    });
    items.push(CulturalItem::Language {
        name: "Hausa".to_string(),
        culture: "Hausa".to_string(),
        description: "Chadic language and West African lingua franca, written in both \
                      Latin boko and Arabic ajami scripts."
            .to_string(),
        region: "Northern Nigeria and Niger".to_string(),
        speakers: "over 50 million".to_string(),
    });
    items.push(CulturalItem::Language {
        name: "Swahili".to_string(),
        culture: "Swahili".to_string(),
        description: "Bantu lingua franca of East Africa shaped by centuries of Indian \
                      Ocean trade, official in several nations."
            .to_string(),
        region: "East African coast and interior".to_string(),
        speakers: "over 80 million".to_string(),
    });
    items.push(CulturalItem::Language {
        name: "Amharic".to_string(),
        culture: "Amhara".to_string(),
        description: "Semitic language of Ethiopia written in the Ge'ez script, with a \
                      long tradition of sacred and court literature."
            .to_string(),
        region: "Ethiopian highlands".to_string(),
        speakers: "about 35 million".to_string(),
    });

    // Proverbs
    items.push(CulturalItem::Proverb {
        name: "The stream and its source".to_string(),
        culture: "Yoruba".to_string(),
        text: "However far the stream flows, it never forgets its source.".to_string(),
        meaning: "People should remember their origins.".to_string(),
    });
    items.push(CulturalItem::Proverb {
        name: "Clean hands".to_string(),
        culture: "Igbo".to_string(),
        text: "A child who washes his hands clean dines with elders.".to_string(),
        meaning: "Good conduct and preparation earn respect.".to_string(),
    });
    items.push(CulturalItem::Proverb {
        name: "Ubuntu".to_string(),
        culture: "Zulu".to_string(),
        text: "Umuntu ngumuntu ngabantu.".to_string(),
        meaning: "A person is a person through other people.".to_string(),
    });
    items.push(CulturalItem::Proverb {
        name: "Haraka haraka".to_string(),
        culture: "Swahili".to_string(),
        text: "Haraka haraka haina baraka.".to_string(),
        meaning: "Hurry, hurry has no blessing; patience yields better results.".to_string(),
    });

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::items::ItemKind;

    #[test]
    fn dataset_round_trips_through_json() {
        let items = builtin();
        let raw = serde_json::to_string(&items).unwrap();
        let parsed = from_json_str(&raw).unwrap();
        assert_eq!(parsed, items);

        assert!(from_json_str("not json").is_err());
    }

    #[test]
    fn builtin_covers_every_category() {
        let items = builtin();
        for kind in ItemKind::all() {
            assert!(
                items.iter().any(|i| i.kind() == kind),
                "missing category {:?}",
                kind
            );
        }
    }

    #[test]
    fn builtin_contains_reference_records() {
        let items = builtin();
        assert!(items.iter().any(|i| i.name() == "Sango Festival"));
        assert!(items.iter().any(|i| i.name() == "Adire"));
    }

    #[test]
    fn names_are_unique_within_category() {
        let items = builtin();
        for (i, a) in items.iter().enumerate() {
            for b in items.iter().skip(i + 1) {
                assert!(
                    a.dedup_key() != b.dedup_key(),
                    "duplicate record {}",
                    a.name()
                );
            }
        }
    }
}
