//! Parsing of M&A alert emails into deal records.
//!
//! Alerts are plain text grouped under industry headings, with numbered deal
//! headlines followed by bullet points and `Size:`/`Grade:` annotations:
//!
//! ```text
//! Computer software
//! 8. Adarga seeks GBP 6m-GBP 8m in new funding - report
//! * Previous USD 20m investment round led by BOKA Group
//! Size: 5m-30m (GBP)
//! ```

use crate::core::classify::Classifier;
use crate::core::value::{extract_value, mentions_currency};
use crate::domain::model::Deal;
use regex::Regex;
use std::sync::LazyLock;

const SUMMARY_MIN_CHARS: usize = 30;
const SUMMARY_MAX_CHARS: usize = 200;

/// Industry headings used by Mergermarket-style alerts.
const KNOWN_SECTIONS: &[&str] = &[
    "agriculture",
    "automotive",
    "computer software",
    "consumer: foods",
    "consumer: other",
    "consumer: retail",
    "defense",
    "energy",
    "financial services",
    "healthcare",
    "industrial automation",
    "industrial products and services",
    "industrial: electronics",
    "real estate",
    "services (other)",
    "technology",
    "telecommunications",
];

static DEAL_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").expect("valid deal header pattern"));
static MARKDOWN_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#{1,6}\s*\**\s*(.+?)\s*\**\s*$").expect("valid heading pattern")
});
static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold pattern"));
static CORPORATE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Z][A-Za-z&]+(?:\s+[A-Z][A-Za-z&]+)*\s+(?:Inc|Corp|Ltd|LLC|SA|AG|GmbH|plc|Group|Partners))\b",
    )
    .expect("valid company pattern")
});
static DEAL_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(acquisitions?|acquires?|mergers?|buyouts?|investments?|stakes?|divestitures?|divests?|ipos?|sales?|funding|jvs?|joint ventures?)\b",
    )
    .expect("valid deal type pattern")
});

fn canonical_deal_type(word: &str) -> &'static str {
    let word = word.to_lowercase();
    if word.starts_with("acqui") {
        "acquisition"
    } else if word.starts_with("merger") {
        "merger"
    } else if word.starts_with("buyout") {
        "buyout"
    } else if word.starts_with("investment") {
        "investment"
    } else if word.starts_with("stake") {
        "stake"
    } else if word.starts_with("divest") {
        "divestiture"
    } else if word.starts_with("ipo") {
        "IPO"
    } else if word.starts_with("sale") {
        "sale"
    } else if word == "funding" {
        "funding"
    } else {
        "joint venture"
    }
}

fn push_unique(items: &mut Vec<String>, item: &str) {
    if !items.iter().any(|existing| existing == item) {
        items.push(item.to_string());
    }
}

fn strip_bold(text: &str) -> String {
    text.replace("**", "").trim().to_string()
}

fn bullet_text(line: &str) -> Option<&str> {
    if line.starts_with("**") {
        return None;
    }
    line.strip_prefix('*')
        .or_else(|| line.strip_prefix("- "))
        .or_else(|| line.strip_prefix('•'))
        .map(str::trim)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn is_deal_header(line: &str) -> bool {
    DEAL_HEADER.is_match(line)
}

/// Heading text if `line` opens a new industry section.
fn section_heading(line: &str, next: Option<&str>) -> Option<String> {
    if let Some(caps) = MARKDOWN_HEADING.captures(line) {
        return Some(strip_bold(&caps[1]));
    }
    if is_deal_header(line) || bullet_text(line).is_some() {
        return None;
    }

    let plain = strip_bold(line);
    if KNOWN_SECTIONS.contains(&plain.to_lowercase().as_str()) {
        return Some(plain);
    }

    // A short label directly above a numbered headline.
    let looks_like_label = plain.split_whitespace().count() <= 5
        && !plain.chars().any(|c| c.is_ascii_digit())
        && !plain.contains(':')
        && !plain.ends_with(['.', '!', '?', ','])
        && plain.chars().next().is_some_and(|c| c.is_uppercase());
    if looks_like_label && next.is_some_and(is_deal_header) {
        return Some(plain);
    }
    None
}

pub struct DealParser {
    classifier: Classifier,
}

impl DealParser {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    pub fn parse(&self, content: &str) -> Vec<Deal> {
        let lines: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut deals = Vec::new();
        let mut section: Option<String> = None;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let next = lines.get(i + 1).copied();

            if let Some(heading) = section_heading(line, next) {
                tracing::debug!("Section: {}", heading);
                section = Some(heading);
                i += 1;
                continue;
            }

            let Some(caps) = DEAL_HEADER.captures(line) else {
                // 第一筆交易之前的前言
                i += 1;
                continue;
            };

            let id = caps[1].to_string();
            let raw_title = caps[2].to_string();

            // 收集內文直到下一個交易或段落標題
            let mut body = Vec::new();
            let mut j = i + 1;
            while j < lines.len() {
                let candidate = lines[j];
                if is_deal_header(candidate)
                    || section_heading(candidate, lines.get(j + 1).copied()).is_some()
                {
                    break;
                }
                body.push(candidate);
                j += 1;
            }

            let deal = self.build_deal(id, &raw_title, section.as_deref(), &body);
            tracing::debug!(
                "Parsed deal #{}: {} [{} / {}]",
                deal.id,
                deal.title,
                deal.sector,
                deal.geography
            );
            deals.push(deal);
            i = j;
        }

        deals
    }

    fn build_deal(&self, id: String, raw_title: &str, section: Option<&str>, body: &[&str]) -> Deal {
        let title = strip_bold(raw_title);
        let original_text = body.join("\n");

        let mut value = extract_value(&title);
        let mut details = Vec::new();
        let mut size = None;
        let mut grade = None;
        let mut press_release = None;
        let mut summary = None;

        for line in body {
            if let Some(detail) = bullet_text(line) {
                details.push(strip_bold(detail));
            } else if let Some((_, rest)) = line.split_once("Size:") {
                size = Some(rest.trim().to_string());
            } else if let Some((_, rest)) = line.split_once("Grade:") {
                grade = Some(rest.trim().to_string());
            } else if line.to_lowercase().starts_with("press release") {
                let text = line["press release".len()..].trim_start_matches([':', ' ', '-']);
                press_release = Some(text.trim().to_string());
            } else {
                if value.is_none() && mentions_currency(line) {
                    value = extract_value(line);
                }
                if summary.is_none() && line.chars().count() > SUMMARY_MIN_CHARS {
                    summary = Some(truncate_chars(&strip_bold(line), SUMMARY_MAX_CHARS));
                }
            }
        }

        let full_text = format!("{}\n{}", raw_title, original_text);
        let mut companies = Vec::new();
        for caps in BOLD_SPAN.captures_iter(&full_text) {
            push_unique(&mut companies, caps[1].trim());
        }
        for caps in CORPORATE_NAME.captures_iter(&full_text) {
            push_unique(&mut companies, caps[1].trim());
        }

        let mut deal_types = Vec::new();
        for caps in DEAL_TYPE.captures_iter(&full_text) {
            push_unique(&mut deal_types, canonical_deal_type(&caps[1]));
        }

        Deal {
            sector: self.classifier.classify_sector(&title, section),
            geography: self.classifier.classify_geography(&title, &original_text),
            id,
            title,
            section: section.map(str::to_string),
            value,
            size,
            grade,
            details,
            summary,
            deal_types,
            companies,
            press_release,
            original_text,
        }
    }
}
