use crate::utils::error::{IntelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    Automotive,
    Technology,
    Financial,
    Industrial,
    Energy,
    Healthcare,
    Consumer,
    RealEstate,
    Agriculture,
    Other,
}

impl Sector {
    pub const ALL: [Sector; 10] = [
        Sector::Automotive,
        Sector::Technology,
        Sector::Financial,
        Sector::Industrial,
        Sector::Energy,
        Sector::Healthcare,
        Sector::Consumer,
        Sector::RealEstate,
        Sector::Agriculture,
        Sector::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sector::Automotive => "Automotive",
            Sector::Technology => "Technology",
            Sector::Financial => "Financial",
            Sector::Industrial => "Industrial",
            Sector::Energy => "Energy",
            Sector::Healthcare => "Healthcare",
            Sector::Consumer => "Consumer",
            Sector::RealEstate => "Real Estate",
            Sector::Agriculture => "Agriculture",
            Sector::Other => "Other",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sector {
    type Err = IntelError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        Sector::ALL
            .iter()
            .copied()
            .find(|sector| {
                let name: String = sector
                    .name()
                    .to_lowercase()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect();
                name == key
            })
            .ok_or_else(|| IntelError::InvalidConfigValueError {
                field: "sector".to_string(),
                value: s.to_string(),
                reason: format!(
                    "Unknown sector. Valid sectors: {}",
                    Sector::ALL.map(|s| s.name()).join(", ")
                ),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Geography {
    Uk,
    Germany,
    France,
    Europe,
    Usa,
    China,
    Asia,
    Global,
}

impl Geography {
    pub const ALL: [Geography; 8] = [
        Geography::Uk,
        Geography::Germany,
        Geography::France,
        Geography::Europe,
        Geography::Usa,
        Geography::China,
        Geography::Asia,
        Geography::Global,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Geography::Uk => "UK",
            Geography::Germany => "Germany",
            Geography::France => "France",
            Geography::Europe => "Europe",
            Geography::Usa => "USA",
            Geography::China => "China",
            Geography::Asia => "Asia",
            Geography::Global => "Global",
        }
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Geography {
    type Err = IntelError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        let alias = match key.as_str() {
            "us" | "united states" => "usa",
            "united kingdom" | "gb" | "britain" => "uk",
            other => other,
        };
        Geography::ALL
            .iter()
            .copied()
            .find(|geo| geo.name().to_lowercase() == alias)
            .ok_or_else(|| IntelError::InvalidConfigValueError {
                field: "geography".to_string(),
                value: s.to_string(),
                reason: format!(
                    "Unknown geography. Valid regions: {}",
                    Geography::ALL.map(|g| g.name()).join(", ")
                ),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Gbp,
    Eur,
    Usd,
    Unknown,
}

impl Currency {
    pub fn from_token(token: &str) -> Self {
        match token.to_uppercase().as_str() {
            "GBP" | "£" => Currency::Gbp,
            "EUR" | "€" => Currency::Eur,
            "USD" | "$" => Currency::Usd,
            _ => Currency::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Unknown => "N/A",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A monetary amount as it appeared in the alert, normalised to millions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealValue {
    pub raw: String,
    pub currency: Currency,
    pub amount_millions: f64,
}

/// Conversion rates into GBP, used to compare values across currencies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxRates {
    pub eur: f64,
    pub usd: f64,
    pub unknown: f64,
}

impl Default for FxRates {
    fn default() -> Self {
        Self {
            eur: 0.85,
            usd: 0.79,
            unknown: 1.0,
        }
    }
}

impl FxRates {
    pub fn to_gbp(&self, currency: Currency, amount: f64) -> f64 {
        match currency {
            Currency::Gbp => amount,
            Currency::Eur => amount * self.eur,
            Currency::Usd => amount * self.usd,
            Currency::Unknown => amount * self.unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub title: String,
    pub section: Option<String>,
    pub sector: Sector,
    pub geography: Geography,
    pub value: Option<DealValue>,
    pub size: Option<String>,
    pub grade: Option<String>,
    pub details: Vec<String>,
    pub summary: Option<String>,
    pub deal_types: Vec<String>,
    pub companies: Vec<String>,
    pub press_release: Option<String>,
    pub original_text: String,
}

impl Deal {
    pub fn is_hot(&self) -> bool {
        self.grade
            .as_deref()
            .map(|g| g.trim().eq_ignore_ascii_case("strong evidence"))
            .unwrap_or(false)
    }

    /// Value label for display: explicit value, then size band, then "Value TBD".
    pub fn value_label(&self) -> String {
        if let Some(value) = &self.value {
            return value.raw.clone();
        }
        match &self.size {
            Some(size) if !size.is_empty() => size.clone(),
            _ => "Value TBD".to_string(),
        }
    }

    pub fn key_points(&self) -> &[String] {
        &self.details[..self.details.len().min(3)]
    }
}

/// Lower bound on deal value, in GBP millions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinValue(pub f64);

impl FromStr for MinValue {
    type Err = IntelError;

    /// Accepts `30m`, `£60M+`, `300`, `1b`, `1bn`, `£1B+`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| IntelError::InvalidConfigValueError {
            field: "min_value".to_string(),
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let cleaned: String = s
            .trim()
            .trim_start_matches('£')
            .trim_end_matches('+')
            .replace(',', "")
            .to_lowercase();
        let (number, multiplier) = if let Some(n) = cleaned.strip_suffix("bn") {
            (n, 1000.0)
        } else if let Some(n) = cleaned.strip_suffix('b') {
            (n, 1000.0)
        } else if let Some(n) = cleaned.strip_suffix('m') {
            (n, 1.0)
        } else {
            (cleaned.as_str(), 1.0)
        };

        let amount: f64 = number
            .trim()
            .parse()
            .map_err(|_| invalid("Expected an amount such as 30m, 300m or 1bn"))?;
        if amount < 0.0 || !amount.is_finite() {
            return Err(invalid("Amount must be a non-negative number"));
        }
        Ok(MinValue(amount * multiplier))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealFilter {
    pub sector: Option<Sector>,
    pub geography: Option<Geography>,
    pub min_value_millions: Option<f64>,
}

impl DealFilter {
    pub fn sector_label(&self) -> String {
        self.sector
            .map(|s| s.name().to_string())
            .unwrap_or_else(|| "All Sectors".to_string())
    }

    pub fn geography_label(&self) -> String {
        self.geography
            .map(|g| g.name().to_string())
            .unwrap_or_else(|| "All Regions".to_string())
    }

    pub fn value_label(&self) -> String {
        match self.min_value_millions {
            Some(v) if v >= 1000.0 => format!("£{}B+", v / 1000.0),
            Some(v) => format!("£{}M+", v),
            None => "Any Value".to_string(),
        }
    }
}

/// One bucket of a distribution, in descending count order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_deals: usize,
    pub filtered_deals: usize,
    pub valued_deals: usize,
    pub average_value_gbp_millions: Option<f64>,
    pub top_sector: Option<String>,
    pub sector_distribution: Vec<CountEntry>,
    pub geography_distribution: Vec<CountEntry>,
    pub section_distribution: Vec<CountEntry>,
    pub currency_distribution: Vec<CountEntry>,
    pub deal_type_distribution: Vec<CountEntry>,
    pub hot_deals: usize,
    pub deals_with_press_releases: usize,
    pub content_length: usize,
}

/// Rendered exports, keyed by format.
#[derive(Debug, Clone, Default)]
pub struct RenderedOutputs {
    pub csv: String,
    pub summary_markdown: String,
    pub json: String,
    pub display: String,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub deals: Vec<Deal>,
    pub filtered: Vec<Deal>,
    pub analytics: Analytics,
    pub outputs: RenderedOutputs,
    pub ai_report: Option<String>,
    pub ai_error: Option<String>,
}
