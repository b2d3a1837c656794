//! Prompt construction for the narrative intelligence report.

use crate::domain::model::{Deal, DealFilter};
use crate::utils::error::Result;
use serde::Serialize;

pub const SYSTEM_PROMPT: &str = "\
You are a senior M&A intelligence analyst writing for executives and private equity partners.

Standards:
- Accuracy first. Use only the deal data provided and never invent figures.
- Classify sectors and geographies consistently and attribute them to the correct parties.
- Distinguish M&A, IPOs, funding rounds and market commentary.
- Quantify wherever the data allows: state values and counts rather than vague qualifiers.
- Lead with conclusions, then supporting evidence.
- Identify strategic rationale: scale, scope, speed to market, scarce assets or defensive moves.
- Flag regulatory, integration, market and financial risks where the data suggests them.
- Be definitive and concise. Avoid hedge words.

Every recommendation must be specific and actionable.";

#[derive(Debug, Serialize)]
struct DealPayload<'a> {
    title: &'a str,
    sector: &'a str,
    geography: &'a str,
    value: String,
    grade: &'a str,
    size: &'a str,
    key_points: &'a [String],
}

/// JSON payload of the deals handed to the model, top three key points each.
pub fn deal_payload(deals: &[Deal]) -> Result<String> {
    let payload: Vec<DealPayload<'_>> = deals
        .iter()
        .map(|deal| DealPayload {
            title: &deal.title,
            sector: deal.sector.name(),
            geography: deal.geography.name(),
            value: deal
                .value
                .as_ref()
                .map(|v| v.raw.clone())
                .unwrap_or_else(|| "TBD".to_string()),
            grade: deal.grade.as_deref().unwrap_or(""),
            size: deal.size.as_deref().unwrap_or(""),
            key_points: deal.key_points(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&payload)?)
}

pub fn user_prompt(deal_data: &str, filter: &DealFilter) -> String {
    format!(
        "Analyze the following M&A deals and write an intelligence report.

DEAL DATA:
{deal_data}

FILTERS APPLIED:
- Sector focus: {sector}
- Geography: {geography}
- Minimum deal value: {value}

REPORT SECTIONS:
1. EXECUTIVE SUMMARY (3-4 sentences): overall activity and the most significant transactions.
2. SECTOR ANALYSIS: dominant sectors, sector drivers, cross-sector consolidation.
3. GEOGRAPHIC INSIGHTS: regional concentration, cross-border activity, geographic drivers.
4. DEAL VALUE ASSESSMENT: valuation signals, large versus mid-market activity.
5. KEY STRATEGIC THEMES: consolidation, technology-driven deals, market expansion.
6. ACTIONABLE RECOMMENDATIONS: opportunities, sectors to watch, timing.

Write in professional, concise Markdown with bullet points and reference specific deals.",
        deal_data = deal_data,
        sector = filter.sector_label(),
        geography = filter.geography_label(),
        value = filter.value_label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::Classifier;
    use crate::core::parser::DealParser;
    use crate::core::sample::SAMPLE_EMAIL;
    use crate::domain::model::Sector;

    #[test]
    fn test_payload_carries_top_three_points() {
        let deals = DealParser::new(Classifier::new().unwrap()).parse(SAMPLE_EMAIL);
        let payload = deal_payload(&deals).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();

        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(items[0]["value"], "EUR 900m");
        assert_eq!(items[1]["value"], "TBD");
        assert_eq!(items[1]["sector"], "Automotive");
        assert_eq!(items[1]["key_points"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_user_prompt_lists_filters() {
        let prompt = user_prompt("[]", &DealFilter::default());
        assert!(prompt.contains("Sector focus: All Sectors"));
        assert!(prompt.contains("Geography: All Regions"));
        assert!(prompt.contains("Minimum deal value: Any Value"));

        let filter = DealFilter {
            sector: Some(Sector::RealEstate),
            geography: None,
            min_value_millions: Some(300.0),
        };
        let prompt = user_prompt("[]", &filter);
        assert!(prompt.contains("Sector focus: Real Estate"));
        assert!(prompt.contains("Minimum deal value: £300M+"));
    }
}
