//! Rendering of filtered deals into CSV, Markdown, JSON and terminal text.

use crate::domain::model::{Analytics, CountEntry, Deal, DealFilter};
use crate::utils::error::{IntelError, Result};
use serde::Serialize;

const BAR_WIDTH: usize = 30;
const KEY_DEALS: usize = 5;

#[derive(Debug, Serialize)]
struct DealRow<'a> {
    id: &'a str,
    title: &'a str,
    section: &'a str,
    sector: &'a str,
    geography: &'a str,
    value: &'a str,
    currency: &'a str,
    value_millions: Option<f64>,
    size: &'a str,
    grade: &'a str,
    hot: bool,
    deal_types: String,
    companies: String,
    details: String,
    summary: &'a str,
    press_release: &'a str,
    original_text: &'a str,
}

impl<'a> From<&'a Deal> for DealRow<'a> {
    fn from(deal: &'a Deal) -> Self {
        Self {
            id: &deal.id,
            title: &deal.title,
            section: deal.section.as_deref().unwrap_or(""),
            sector: deal.sector.name(),
            geography: deal.geography.name(),
            value: deal.value.as_ref().map(|v| v.raw.as_str()).unwrap_or("TBD"),
            currency: deal.value.as_ref().map(|v| v.currency.code()).unwrap_or(""),
            value_millions: deal.value.as_ref().map(|v| v.amount_millions),
            size: deal.size.as_deref().unwrap_or(""),
            grade: deal.grade.as_deref().unwrap_or(""),
            hot: deal.is_hot(),
            deal_types: deal.deal_types.join(";"),
            companies: deal.companies.join(";"),
            details: deal.details.join(" | "),
            summary: deal.summary.as_deref().unwrap_or(""),
            press_release: deal.press_release.as_deref().unwrap_or(""),
            original_text: &deal.original_text,
        }
    }
}

pub fn render_csv(deals: &[Deal]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for deal in deals {
        writer.serialize(DealRow::from(deal))?;
    }
    // serialize() only writes headers with the first row
    if deals.is_empty() {
        writer.write_record([
            "id", "title", "section", "sector", "geography", "value", "currency",
            "value_millions", "size", "grade", "hot", "deal_types", "companies", "details",
            "summary", "press_release", "original_text",
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| IntelError::ProcessingError {
        message: format!("Could not flush CSV output: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| IntelError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

/// Horizontal text bar chart, bars scaled to the largest count.
pub fn bar_chart(title: &str, entries: &[CountEntry]) -> String {
    let mut lines = vec![title.to_string()];
    if entries.is_empty() {
        lines.push("  (no data)".to_string());
        return lines.join("\n");
    }

    let max = entries.iter().map(|e| e.count).max().unwrap_or(1).max(1);
    let label_width = entries.iter().map(|e| e.label.chars().count()).max().unwrap_or(0);
    for entry in entries {
        let len = (entry.count * BAR_WIDTH).div_ceil(max);
        lines.push(format!(
            "  {:<width$} | {} {}",
            entry.label,
            "█".repeat(len),
            entry.count,
            width = label_width
        ));
    }
    lines.join("\n")
}

fn format_millions(value: f64) -> String {
    if value >= 1000.0 {
        format!("£{:.2}bn", value / 1000.0)
    } else {
        format!("£{:.1}m", value)
    }
}

pub fn render_summary_markdown(
    analytics: &Analytics,
    filtered: &[Deal],
    filter: &DealFilter,
    generated_at: &str,
    ai_error: Option<&str>,
) -> String {
    let mut out = Vec::new();
    out.push("# M&A Intelligence Report".to_string());
    out.push(String::new());
    out.push(format!("Generated on: {}", generated_at));
    out.push(String::new());

    out.push("## Filters".to_string());
    out.push(format!("- Sector: {}", filter.sector_label()));
    out.push(format!("- Geography: {}", filter.geography_label()));
    out.push(format!("- Minimum value: {}", filter.value_label()));
    out.push(String::new());

    out.push("## Summary Statistics".to_string());
    out.push(format!("- Total Deals Processed: {}", analytics.total_deals));
    out.push(format!("- Deals After Filtering: {}", analytics.filtered_deals));
    out.push(format!("- Deals With Values: {}", analytics.valued_deals));
    out.push(format!(
        "- Average Deal Value: {}",
        analytics
            .average_value_gbp_millions
            .map(format_millions)
            .unwrap_or_else(|| "N/A".to_string())
    ));
    out.push(format!(
        "- Top Sector: {}",
        analytics.top_sector.as_deref().unwrap_or("N/A")
    ));
    out.push(format!(
        "- Geographic Spread: {} regions",
        analytics.geography_distribution.len()
    ));
    out.push(format!("- Hot Deals: {}", analytics.hot_deals));
    out.push(format!(
        "- Deals With Press Releases: {}",
        analytics.deals_with_press_releases
    ));
    out.push(String::new());

    out.push("## Deal Distribution".to_string());
    out.push("```text".to_string());
    out.push(bar_chart("By sector", &analytics.sector_distribution));
    out.push(String::new());
    out.push(bar_chart("By geography", &analytics.geography_distribution));
    if !analytics.deal_type_distribution.is_empty() {
        out.push(String::new());
        out.push(bar_chart("By deal type", &analytics.deal_type_distribution));
    }
    out.push("```".to_string());
    out.push(String::new());

    out.push("## Key Deals".to_string());
    if filtered.is_empty() {
        out.push("No deals match the current filters.".to_string());
    }
    for deal in filtered.iter().take(KEY_DEALS) {
        out.push(format!("- {} ({})", deal.title, deal.value_label()));
    }

    if let Some(error) = ai_error {
        out.push(String::new());
        out.push("## AI Intelligence Report".to_string());
        out.push(format!("Not generated: {}", error));
    }

    out.push(String::new());
    out.join("\n")
}

#[derive(Serialize)]
struct JsonExport<'a> {
    generated_at: &'a str,
    filter: &'a DealFilter,
    analytics: &'a Analytics,
    deals: &'a [Deal],
}

pub fn render_json(
    analytics: &Analytics,
    filtered: &[Deal],
    filter: &DealFilter,
    generated_at: &str,
) -> Result<String> {
    let export = JsonExport {
        generated_at,
        filter,
        analytics,
        deals: filtered,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Deal cards for the terminal.
pub fn render_display(analytics: &Analytics, filtered: &[Deal]) -> String {
    let mut out = Vec::new();
    out.push("=== M&A INTELLIGENCE ===".to_string());
    out.push(format!(
        "Total Deals: {}  |  Filtered: {}  |  Avg Value: {}  |  Top Sector: {}",
        analytics.total_deals,
        analytics.filtered_deals,
        analytics
            .average_value_gbp_millions
            .map(format_millions)
            .unwrap_or_else(|| "N/A".to_string()),
        analytics.top_sector.as_deref().unwrap_or("N/A"),
    ));
    out.push(String::new());

    if filtered.is_empty() {
        out.push("No deals match your current filters. Try adjusting the filter criteria.".to_string());
        return out.join("\n");
    }

    for deal in filtered {
        out.push(format!("#{} {}", deal.id, deal.title));
        out.push(format!("   Value:     {}", deal.value_label()));
        out.push(format!("   Sector:    {}", deal.sector));
        out.push(format!("   Geography: {}", deal.geography));
        out.push(format!(
            "   Grade:     {}{}",
            deal.grade.as_deref().unwrap_or("Pending"),
            if deal.is_hot() { " [HOT]" } else { "" }
        ));
        for point in deal.key_points() {
            out.push(format!("   • {}", point));
        }
        if let Some(summary) = &deal.summary {
            out.push(format!("   {}", summary));
        }
        out.push("---".to_string());
    }

    out.push(String::new());
    out.push(bar_chart("Deals by sector", &analytics.sector_distribution));
    out.push(bar_chart("Deals by geography", &analytics.geography_distribution));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analytics::compute;
    use crate::core::classify::Classifier;
    use crate::core::parser::DealParser;
    use crate::core::sample::SAMPLE_EMAIL;
    use crate::domain::model::FxRates;

    fn sample() -> (Vec<Deal>, Analytics) {
        let deals = DealParser::new(Classifier::new().unwrap()).parse(SAMPLE_EMAIL);
        let analytics = compute(&deals, &deals, SAMPLE_EMAIL.len(), &FxRates::default());
        (deals, analytics)
    }

    #[test]
    fn test_csv_has_header_and_one_row_per_deal() {
        let (deals, _) = sample();
        let csv_output = render_csv(&deals).unwrap();

        let mut reader = csv::Reader::from_reader(csv_output.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "id");
        assert_eq!(&headers[3], "sector");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 6);
        assert_eq!(&rows[0][5], "EUR 900m");
        assert_eq!(&rows[1][5], "TBD");
        // Details with commas survive quoting.
        assert!(rows[1][13].contains("Switzerland, Spain"));
    }

    #[test]
    fn test_csv_empty_still_has_header() {
        let csv_output = render_csv(&[]).unwrap();
        assert!(csv_output.starts_with("id,title,section,sector"));
        assert_eq!(csv_output.lines().count(), 1);
    }

    #[test]
    fn test_bar_chart_scales_to_max() {
        let entries = vec![
            CountEntry { label: "Technology".to_string(), count: 4 },
            CountEntry { label: "Energy".to_string(), count: 2 },
        ];
        let chart = bar_chart("By sector", &entries);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[0], "By sector");
        assert_eq!(lines[1].matches('█').count(), 30);
        assert_eq!(lines[2].matches('█').count(), 15);
        assert!(lines[2].starts_with("  Energy     |"));
        assert!(bar_chart("Empty", &[]).contains("(no data)"));
    }

    #[test]
    fn test_summary_markdown_sections() {
        let (deals, analytics) = sample();
        let summary = render_summary_markdown(
            &analytics,
            &deals,
            &DealFilter::default(),
            "2025-01-01 09:00:00",
            None,
        );
        assert!(summary.contains("Generated on: 2025-01-01 09:00:00"));
        assert!(summary.contains("- Total Deals Processed: 6"));
        assert!(summary.contains("- Top Sector: Technology"));
        assert!(summary.contains("- Stora Enso divests forest assets for EUR 900m (EUR 900m)"));
        assert!(summary.contains("(Value TBD)"));
        // Only the first five deals are listed.
        assert!(!summary.contains("- CoreWeave"));
        assert!(!summary.contains("AI Intelligence Report"));
    }

    #[test]
    fn test_summary_notes_ai_failure() {
        let (deals, analytics) = sample();
        let summary = render_summary_markdown(
            &analytics,
            &deals,
            &DealFilter::default(),
            "now",
            Some("AI provider rejected the API key"),
        );
        assert!(summary.contains("Not generated: AI provider rejected the API key"));
    }

    #[test]
    fn test_json_export_round_trips_deals() {
        let (deals, analytics) = sample();
        let json = render_json(&analytics, &deals, &DealFilter::default(), "now").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["deals"].as_array().unwrap().len(), 6);
        assert_eq!(value["analytics"]["total_deals"], 6);
    }

    #[test]
    fn test_display_cards() {
        let (deals, analytics) = sample();
        let display = render_display(&analytics, &deals);
        assert!(display.contains("#1 Stora Enso divests forest assets for EUR 900m"));
        assert!(display.contains("Grade:     Pending"));
        assert!(display.contains("Deals by sector"));

        let empty = render_display(&analytics, &[]);
        assert!(empty.contains("No deals match your current filters"));
    }
}
