//! Dashboard reports: KPIs, daily series and group tables

use std::collections::HashMap;

use crate::filter::FilteredSlice;
use crate::models::{margin_fraction, DailyRow, GroupSummary, Kpis, LineItem, ProductSummary};
use crate::stats::mean;

/// Headline KPIs over the filtered daily rows
pub fn kpis(slice: &FilteredSlice<'_>) -> Kpis {
    let rows = daily_rows(slice);
    let gcr: Vec<f64> = rows.iter().map(|r| r.avg_gcr).collect();
    let margins: Vec<f64> = rows.iter().filter_map(|r| r.margin_pct).collect();

    Kpis {
        cogs: rows.iter().map(|r| r.daily_cogs).sum(),
        revenue: rows.iter().map(|r| r.daily_rev).sum(),
        avg_gcr: mean(&gcr),
        margin_pct: mean(&margins),
        days: rows.len(),
    }
}

/// Filtered daily rows with margin columns, sorted by date
pub fn daily_rows(slice: &FilteredSlice<'_>) -> Vec<DailyRow> {
    let mut rows: Vec<DailyRow> = slice.daily.iter().map(|d| DailyRow::from_summary(d)).collect();
    rows.sort_by_key(|r| r.date);
    rows
}

/// COGS, revenue and margin per site, highest COGS first
pub fn site_summary(slice: &FilteredSlice<'_>) -> Vec<GroupSummary> {
    group_summary(&slice.line_items, |i| i.site.as_str())
}

/// COGS, revenue and margin per customer, highest COGS first
pub fn customer_summary(slice: &FilteredSlice<'_>) -> Vec<GroupSummary> {
    group_summary(&slice.line_items, |i| i.customer_id.as_str())
}

#[derive(Default)]
struct Accumulator {
    cogs: f64,
    rev: f64,
    gcr_sum: f64,
    count: usize,
}

fn group_summary<'a, F>(items: &[&'a LineItem], key: F) -> Vec<GroupSummary>
where
    F: Fn(&'a LineItem) -> &'a str,
{
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();
    for &item in items {
        let acc = groups.entry(key(item)).or_default();
        acc.cogs += item.extended_cogs;
        acc.rev += item.extended_revenue;
        acc.gcr_sum += item.gcr;
        acc.count += 1;
    }

    let mut rows: Vec<GroupSummary> = groups
        .into_iter()
        .map(|(key, acc)| {
            let margin = acc.rev - acc.cogs;
            GroupSummary {
                key: key.to_string(),
                cogs: acc.cogs,
                rev: acc.rev,
                avg_gcr: acc.gcr_sum / acc.count as f64,
                margin,
                margin_pct: margin_fraction(margin, acc.rev),
            }
        })
        .collect();

    // Ties fall back to key order so output is deterministic
    rows.sort_by(|a, b| {
        b.cogs
            .partial_cmp(&a.cogs)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    rows
}

/// Quantity, COGS, revenue and margin per product, highest COGS first
pub fn product_summary(slice: &FilteredSlice<'_>) -> Vec<ProductSummary> {
    let mut groups: HashMap<(&str, &str, bool), (f64, f64, f64)> = HashMap::new();
    for item in &slice.line_items {
        let entry = groups
            .entry((
                item.product_id.as_str(),
                item.product_name.as_str(),
                item.is_generic,
            ))
            .or_default();
        entry.0 += item.qty;
        entry.1 += item.extended_cogs;
        entry.2 += item.extended_revenue;
    }

    let mut rows: Vec<ProductSummary> = groups
        .into_iter()
        .map(|((id, name, is_generic), (qty, cogs, rev))| {
            let margin = rev - cogs;
            ProductSummary {
                product_id: id.to_string(),
                product_name: name.to_string(),
                is_generic,
                qty,
                cogs,
                rev,
                margin,
                margin_pct: margin_fraction(margin, rev),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.cogs
            .partial_cmp(&a.cogs)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    rows
}
