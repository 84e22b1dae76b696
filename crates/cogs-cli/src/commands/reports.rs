//! Report command implementations

use anyhow::Result;
use cogs_core::format::{format_currency, format_percent};
use cogs_core::models::GroupSummary;
use cogs_core::{report, DashboardFilter, Dataset};

use super::{describe_filter, truncate};

fn percent_or_dash(value: Option<f64>) -> String {
    value
        .map(|v| format_percent(v, 1))
        .unwrap_or_else(|| "-".to_string())
}

pub fn cmd_kpis(dataset: &Dataset, filter: &DashboardFilter) -> Result<()> {
    let slice = filter.apply(dataset)?;
    let kpis = report::kpis(&slice);

    println!();
    println!("📊 COGS Overview");
    println!("   {}", describe_filter(filter, dataset));
    println!("   ─────────────────────────────────────────────────────────────");

    if kpis.days == 0 {
        println!("   No days in the selected range.");
        return Ok(());
    }

    println!("   COGs:        {:>12}", format_currency(kpis.cogs));
    println!("   Revenue:     {:>12}", format_currency(kpis.revenue));
    println!("   Avg GCR:     {:>12}", percent_or_dash(kpis.avg_gcr));
    println!("   Avg Margin%: {:>12}", percent_or_dash(kpis.margin_pct));
    println!("   Days:        {:>12}", kpis.days);
    println!("   Line items:  {:>12}", slice.line_items.len());

    Ok(())
}

pub fn cmd_daily(dataset: &Dataset, filter: &DashboardFilter) -> Result<()> {
    let slice = filter.apply(dataset)?;
    let rows = report::daily_rows(&slice);

    println!();
    println!("📈 Daily COGs and GCR");
    println!("   {}", describe_filter(filter, dataset));
    println!("   ─────────────────────────────────────────────────────────────");

    if rows.is_empty() {
        println!("   No days in the selected range.");
        return Ok(());
    }

    println!(
        "   {:10} │ {:>10} │ {:>10} │ {:>7} │ {:>10} │ {:>8}",
        "Date", "COGs", "Revenue", "GCR", "Margin", "Margin%"
    );
    println!("   ───────────┼────────────┼────────────┼─────────┼────────────┼─────────");

    for row in &rows {
        println!(
            "   {:10} │ {:>10} │ {:>10} │ {:>7} │ {:>10} │ {:>8}",
            row.date,
            format_currency(row.daily_cogs),
            format_currency(row.daily_rev),
            format_percent(row.avg_gcr, 1),
            format_currency(row.margin_dollars),
            percent_or_dash(row.margin_pct)
        );
    }

    Ok(())
}

fn print_groups(label: &str, groups: &[GroupSummary], limit: usize) {
    if groups.is_empty() {
        println!("   No line items match the selection.");
        return;
    }

    println!(
        "   {:24} │ {:>10} │ {:>10} │ {:>7} │ {:>8}",
        label, "COGs", "Revenue", "GCR", "Margin%"
    );
    println!("   ─────────────────────────┼────────────┼────────────┼─────────┼─────────");

    for group in groups.iter().take(limit) {
        println!(
            "   {:24} │ {:>10} │ {:>10} │ {:>7} │ {:>8}",
            truncate(&group.key, 24),
            format_currency(group.cogs),
            format_currency(group.rev),
            format_percent(group.avg_gcr, 1),
            percent_or_dash(group.margin_pct)
        );
    }

    if groups.len() > limit {
        println!("   ... and {} more", groups.len() - limit);
    }
}

pub fn cmd_sites(dataset: &Dataset, filter: &DashboardFilter) -> Result<()> {
    let slice = filter.apply(dataset)?;
    let sites = report::site_summary(&slice);

    println!();
    println!("🏥 COGs by Site");
    println!("   {}", describe_filter(filter, dataset));
    println!("   ─────────────────────────────────────────────────────────────");
    print_groups("Site", &sites, sites.len());

    Ok(())
}

pub fn cmd_customers(dataset: &Dataset, filter: &DashboardFilter, limit: usize) -> Result<()> {
    let slice = filter.apply(dataset)?;
    let customers = report::customer_summary(&slice);

    println!();
    println!("👥 COGs by Customer");
    println!("   {}", describe_filter(filter, dataset));
    println!("   ─────────────────────────────────────────────────────────────");
    print_groups("Customer", &customers, limit);

    Ok(())
}

pub fn cmd_products(dataset: &Dataset, filter: &DashboardFilter, limit: usize) -> Result<()> {
    let slice = filter.apply(dataset)?;
    let products = report::product_summary(&slice);

    println!();
    println!("💊 COGs by Product");
    println!("   {}", describe_filter(filter, dataset));
    println!("   ─────────────────────────────────────────────────────────────");

    if products.is_empty() {
        println!("   No line items match the selection.");
        return Ok(());
    }

    println!(
        "   {:8} │ {:24} │ {:7} │ {:>7} │ {:>10} │ {:>10} │ {:>8}",
        "ID", "Product", "Type", "Qty", "COGs", "Revenue", "Margin%"
    );
    println!(
        "   ─────────┼──────────────────────────┼─────────┼─────────┼────────────┼────────────┼─────────"
    );

    for product in products.iter().take(limit) {
        println!(
            "   {:8} │ {:24} │ {:7} │ {:>7.0} │ {:>10} │ {:>10} │ {:>8}",
            truncate(&product.product_id, 8),
            truncate(&product.product_name, 24),
            if product.is_generic { "generic" } else { "brand" },
            product.qty,
            format_currency(product.cogs),
            format_currency(product.rev),
            percent_or_dash(product.margin_pct)
        );
    }

    if products.len() > limit {
        println!("   ... and {} more", products.len() - limit);
    }

    Ok(())
}
