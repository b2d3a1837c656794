//! Keyword classification of deal text into sectors and geographies.
//!
//! Tables are ordered: the first entry with a keyword hit wins. Keywords match
//! case-insensitively on word boundaries, with an optional plural `s`.

use crate::domain::model::{Geography, Sector};
use crate::utils::error::{IntelError, Result};
use regex::Regex;

const SECTOR_KEYWORDS: &[(Sector, &[&str])] = &[
    (
        Sector::Automotive,
        &["auto", "car", "vehicle", "motor", "automotive", "tesla", "ford", "bmw", "ev"],
    ),
    (
        Sector::Technology,
        &[
            "tech", "technology", "software", "ai", "digital", "data", "cyber", "saas", "cloud",
            "app", "semiconductor", "computer",
        ],
    ),
    (
        Sector::Financial,
        &[
            "bank", "banking", "finance", "financial", "capital", "investment", "insurance",
            "insurer", "fund", "fintech", "asset manager",
        ],
    ),
    (
        Sector::Industrial,
        &[
            "construction", "industrial", "manufacturing", "manufacturer", "engineering",
            "chemical", "steel", "defense", "defence", "electronics",
        ],
    ),
    (
        Sector::Energy,
        &["energy", "oil", "gas", "renewable", "power", "solar", "wind", "nuclear", "utility"],
    ),
    (
        Sector::Healthcare,
        &[
            "health", "healthcare", "medical", "pharma", "pharmaceutical", "biotech", "hospital",
            "drug", "medicine", "clinic",
        ],
    ),
    (
        Sector::Consumer,
        &["retail", "retailer", "consumer", "food", "beauty", "fashion", "beverage", "brand"],
    ),
    (
        Sector::RealEstate,
        &["real estate", "property", "properties", "reit", "building", "development"],
    ),
    (
        Sector::Agriculture,
        &["agriculture", "agricultural", "farming", "farm", "crop", "livestock", "forest", "forestry"],
    ),
];

const GEOGRAPHY_KEYWORDS: &[(Geography, &[&str])] = &[
    (
        Geography::Uk,
        &["uk", "britain", "london", "england", "scotland", "wales", "british"],
    ),
    (Geography::Germany, &["german", "germany", "berlin", "munich", "deutsche"]),
    (Geography::France, &["france", "french", "paris"]),
    (Geography::Europe, &["europe", "european", "eu"]),
    (
        Geography::Usa,
        &["us", "usa", "america", "american", "new york", "california"],
    ),
    (Geography::China, &["china", "chinese", "beijing", "shanghai"]),
    (
        Geography::Asia,
        &["asia", "asian", "japan", "japanese", "singapore", "hong kong", "india"],
    ),
];

fn keyword_regex(keywords: &[String]) -> Result<Regex> {
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k.trim()))
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})s?\b", alternation)).map_err(|e| {
        IntelError::ConfigValidationError {
            field: "keywords".to_string(),
            message: format!("Could not build keyword matcher: {}", e),
        }
    })
}

fn build_table<K: Copy + PartialEq>(
    base: &[(K, &[&str])],
    extra: &[(K, Vec<String>)],
) -> Result<Vec<(K, Regex)>> {
    base.iter()
        .map(|(key, words)| {
            let mut keywords: Vec<String> = words.iter().map(|w| w.to_string()).collect();
            for (extra_key, extra_words) in extra {
                if extra_key == key {
                    keywords.extend(extra_words.iter().cloned());
                }
            }
            Ok((*key, keyword_regex(&keywords)?))
        })
        .collect()
}

pub struct Classifier {
    sectors: Vec<(Sector, Regex)>,
    geographies: Vec<(Geography, Regex)>,
}

impl Classifier {
    pub fn new() -> Result<Self> {
        Self::with_extra_keywords(&[], &[])
    }

    /// Builds the tables with additional keywords appended to the named entries.
    /// `Sector::Other` and `Geography::Global` are fallbacks and take no keywords.
    pub fn with_extra_keywords(
        extra_sectors: &[(Sector, Vec<String>)],
        extra_geographies: &[(Geography, Vec<String>)],
    ) -> Result<Self> {
        Ok(Self {
            sectors: build_table(SECTOR_KEYWORDS, extra_sectors)?,
            geographies: build_table(GEOGRAPHY_KEYWORDS, extra_geographies)?,
        })
    }

    pub fn sector(&self, text: &str) -> Option<Sector> {
        self.sectors
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(sector, _)| *sector)
    }

    pub fn geography(&self, text: &str) -> Option<Geography> {
        self.geographies
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(geo, _)| *geo)
    }

    /// Sector of a deal title, falling back to its section heading, then `Other`.
    pub fn classify_sector(&self, title: &str, section: Option<&str>) -> Sector {
        self.sector(title)
            .or_else(|| section.and_then(|s| self.sector(s)))
            .unwrap_or(Sector::Other)
    }

    /// Geography of a deal title, falling back to its body text, then `Global`.
    pub fn classify_geography(&self, title: &str, body: &str) -> Geography {
        self.geography(title)
            .or_else(|| self.geography(body))
            .unwrap_or(Geography::Global)
    }
}
