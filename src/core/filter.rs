use crate::core::value::size_lower_bound;
use crate::domain::model::{Deal, DealFilter, FxRates};

/// Deal value in GBP millions: the explicit value, else the size band's lower bound.
pub fn effective_value_gbp(deal: &Deal, fx: &FxRates) -> Option<f64> {
    if let Some(value) = &deal.value {
        return Some(fx.to_gbp(value.currency, value.amount_millions));
    }
    deal.size
        .as_deref()
        .and_then(size_lower_bound)
        .map(|(currency, millions)| fx.to_gbp(currency, millions))
}

pub fn matches(deal: &Deal, filter: &DealFilter, fx: &FxRates) -> bool {
    if let Some(sector) = filter.sector {
        if deal.sector != sector {
            return false;
        }
    }

    if let Some(geography) = filter.geography {
        if deal.geography != geography {
            return false;
        }
    }

    if let Some(min) = filter.min_value_millions {
        // 沒有金額或規模的交易無法判斷，直接排除
        match effective_value_gbp(deal, fx) {
            Some(value) if value >= min => {}
            _ => return false,
        }
    }

    true
}

/// Deals passing `filter`, in input order.
pub fn apply_filter(deals: &[Deal], filter: &DealFilter, fx: &FxRates) -> Vec<Deal> {
    deals
        .iter()
        .filter(|deal| matches(deal, filter, fx))
        .cloned()
        .collect()
}
