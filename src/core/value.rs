//! Currency value and size-band extraction.

use crate::domain::model::{Currency, DealValue};
use regex::{Captures, Regex};
use std::sync::LazyLock;

const UNIT: &str = r"(bn|billion|b|mn|million|m|k|thousand)?\b";

// Patterns are tried in order; the first one that yields a parsable amount wins.
static CODE_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(EUR|USD|GBP)\s*([\d][\d,]*(?:\.\d+)?)\s*{}", UNIT))
        .expect("valid currency pattern")
});
static SYMBOL_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)([$£€])\s*([\d][\d,]*(?:\.\d+)?)\s*{}", UNIT))
        .expect("valid symbol pattern")
});
static AMOUNT_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([\d][\d,]*(?:\.\d+)?)\s*(EUR|USD|GBP|million|billion)\b")
        .expect("valid amount pattern")
});
static CURRENCY_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(EUR|USD|GBP|billion|million)\b|[$£€]\s*\d").expect("valid token pattern")
});
static SIZE_BOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d][\d,]*(?:\.\d+)?)\s*(bn|b|m)\b").expect("valid size pattern")
});
static SIZE_UPPER_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:<|≤|up\s+to\b|below\b|under\b|less\s+than\b)")
        .expect("valid upper bound pattern")
});
static SIZE_CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(EUR|USD|GBP)\b").expect("valid size currency pattern"));

fn unit_multiplier(unit: Option<&str>) -> Option<f64> {
    match unit.map(|u| u.to_lowercase()).as_deref() {
        Some("bn" | "billion" | "b") => Some(1000.0),
        Some("mn" | "million" | "m") => Some(1.0),
        Some("k" | "thousand") => Some(0.001),
        _ => None,
    }
}

/// Normalises an amount to millions. Without a unit, figures of 100 000 or more
/// are read as absolute units and smaller figures as millions.
fn to_millions(amount: &str, unit: Option<&str>) -> Option<f64> {
    let amount: f64 = amount.replace(',', "").parse().ok()?;
    if !amount.is_finite() {
        return None;
    }
    Some(match unit_multiplier(unit) {
        Some(multiplier) => amount * multiplier,
        None if amount >= 100_000.0 => amount / 1_000_000.0,
        None => amount,
    })
}

fn from_code_first(caps: &Captures<'_>) -> Option<(Currency, f64)> {
    let currency = Currency::from_token(&caps[1]);
    let millions = to_millions(&caps[2], caps.get(3).map(|m| m.as_str()))?;
    Some((currency, millions))
}

fn from_amount_first(caps: &Captures<'_>) -> Option<(Currency, f64)> {
    let token = &caps[2];
    match token.to_lowercase().as_str() {
        "million" | "billion" => Some((Currency::Unknown, to_millions(&caps[1], Some(token))?)),
        _ => Some((Currency::from_token(token), to_millions(&caps[1], None)?)),
    }
}

fn from_symbol_first(caps: &Captures<'_>) -> Option<(Currency, f64)> {
    let currency = Currency::from_token(&caps[1]);
    let millions = to_millions(&caps[2], caps.get(3).map(|m| m.as_str()))?;
    Some((currency, millions))
}

type Extractor = fn(&Captures<'_>) -> Option<(Currency, f64)>;

/// Extracts the first monetary value mentioned in `text`.
pub fn extract_value(text: &str) -> Option<DealValue> {
    let patterns: [(&Regex, Extractor); 3] = [
        (&CODE_FIRST, from_code_first),
        (&AMOUNT_FIRST, from_amount_first),
        (&SYMBOL_FIRST, from_symbol_first),
    ];

    for (regex, extract) in patterns {
        for caps in regex.captures_iter(text) {
            if let Some((currency, amount_millions)) = extract(&caps) {
                let raw = caps[0].trim().to_string();
                return Some(DealValue {
                    raw,
                    currency,
                    amount_millions,
                });
            }
        }
    }
    None
}

/// Whether a line mentions a currency or magnitude worth scanning for a value.
pub fn mentions_currency(text: &str) -> bool {
    CURRENCY_TOKEN.is_match(text)
}

/// Lower bound of a size band such as `60m-300m (GBP)` or `> 300m`, in millions.
/// Bands without a currency are taken to be GBP. Upper-only bands (`< 30m`,
/// `up to 30m`) have no lower bound.
pub fn size_lower_bound(size: &str) -> Option<(Currency, f64)> {
    if SIZE_UPPER_ONLY.is_match(size) {
        return None;
    }
    let caps = SIZE_BOUND.captures(size)?;
    let millions = to_millions(&caps[1], Some(&caps[2]))?;
    let currency = SIZE_CURRENCY
        .captures(size)
        .map(|c| Currency::from_token(&c[1]))
        .unwrap_or(Currency::Gbp);
    Some((currency, millions))
}
