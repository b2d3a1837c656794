use crate::domain::model::{Analytics, CountEntry, Deal, FxRates};

/// Counts labels, most frequent first; ties keep first-appearance order.
pub fn count_by<I, S>(labels: I) -> Vec<CountEntry>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut entries: Vec<CountEntry> = Vec::new();
    for label in labels {
        let label = label.into();
        match entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => entry.count += 1,
            None => entries.push(CountEntry { label, count: 1 }),
        }
    }
    // sort_by is stable, so equal counts stay in appearance order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

/// Valued deals and the average count stated values only; size bands feed the filter.
pub fn compute(all_deals: &[Deal], filtered: &[Deal], content_length: usize, fx: &FxRates) -> Analytics {
    let values: Vec<f64> = filtered
        .iter()
        .filter_map(|deal| deal.value.as_ref())
        .map(|value| fx.to_gbp(value.currency, value.amount_millions))
        .collect();
    let average_value_gbp_millions = if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    };

    let sector_distribution = count_by(filtered.iter().map(|d| d.sector.name()));
    let top_sector = sector_distribution.first().map(|e| e.label.clone());

    Analytics {
        total_deals: all_deals.len(),
        filtered_deals: filtered.len(),
        valued_deals: values.len(),
        average_value_gbp_millions,
        top_sector,
        sector_distribution,
        geography_distribution: count_by(filtered.iter().map(|d| d.geography.name())),
        section_distribution: count_by(
            filtered
                .iter()
                .map(|d| d.section.clone().unwrap_or_else(|| "Unsectioned".to_string())),
        ),
        currency_distribution: count_by(
            filtered
                .iter()
                .filter_map(|d| d.value.as_ref())
                .map(|v| v.currency.code()),
        ),
        deal_type_distribution: count_by(
            filtered.iter().flat_map(|d| d.deal_types.iter().cloned()),
        ),
        hot_deals: filtered.iter().filter(|d| d.is_hot()).count(),
        deals_with_press_releases: filtered.iter().filter(|d| d.press_release.is_some()).count(),
        content_length,
    }
}
