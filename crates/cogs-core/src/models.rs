//! Data models for the COGS report agent

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single transactional line item (one product sold to one customer at one site)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub date: NaiveDate,
    pub site: String,
    pub customer_id: String,
    pub product_id: String,
    pub product_name: String,
    pub is_generic: bool,
    pub qty: f64,
    pub extended_cogs: f64,
    pub extended_revenue: f64,
    /// Generic-content ratio of the line
    #[serde(rename = "GCR")]
    pub gcr: f64,
}

/// One row of the pre-aggregated daily summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub daily_cogs: f64,
    pub daily_rev: f64,
    pub avg_gcr: f64,
}

/// Data dictionary entry describing a column of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub field: String,
    pub description: String,
}

/// Product type filter (generic vs branded)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[default]
    All,
    GenericOnly,
    BrandOnly,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::All => "all",
            ProductType::GenericOnly => "generic",
            ProductType::BrandOnly => "brand",
        }
    }

    /// Label used in the agent context (matches the dashboard selector)
    pub fn label(&self) -> &'static str {
        match self {
            ProductType::All => "All",
            ProductType::GenericOnly => "Generic only",
            ProductType::BrandOnly => "Brand only",
        }
    }

    /// Whether a line item with the given generic flag passes this filter
    pub fn matches(&self, is_generic: bool) -> bool {
        match self {
            ProductType::All => true,
            ProductType::GenericOnly => is_generic,
            ProductType::BrandOnly => !is_generic,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ProductType::All),
            "generic" | "generic-only" | "generic only" => Ok(ProductType::GenericOnly),
            "brand" | "brand-only" | "brand only" => Ok(ProductType::BrandOnly),
            _ => Err(format!(
                "Unknown product type: {}. Available: all, generic, brand",
                s
            )),
        }
    }
}

/// Daily row with derived margin columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub daily_cogs: f64,
    pub daily_rev: f64,
    pub avg_gcr: f64,
    /// Revenue minus cost
    pub margin_dollars: f64,
    /// Margin as a fraction of revenue (None when revenue is not positive)
    pub margin_pct: Option<f64>,
}

impl DailyRow {
    pub fn from_summary(summary: &DailySummary) -> Self {
        let margin_dollars = summary.daily_rev - summary.daily_cogs;
        Self {
            date: summary.date,
            daily_cogs: summary.daily_cogs,
            daily_rev: summary.daily_rev,
            avg_gcr: summary.avg_gcr,
            margin_dollars,
            margin_pct: margin_fraction(margin_dollars, summary.daily_rev),
        }
    }

    /// Look up a numeric column by name (used to render chart suggestions)
    pub fn column(&self, name: &str) -> Option<f64> {
        match name {
            "daily_cogs" => Some(self.daily_cogs),
            "daily_rev" => Some(self.daily_rev),
            "avg_gcr" => Some(self.avg_gcr),
            "margin_dollars" => Some(self.margin_dollars),
            "margin_pct" => self.margin_pct,
            _ => None,
        }
    }

    /// Whether `name` is a known numeric column of the daily series
    pub fn has_column(name: &str) -> bool {
        matches!(
            name,
            "daily_cogs" | "daily_rev" | "avg_gcr" | "margin_dollars" | "margin_pct"
        )
    }
}

/// Headline KPIs for the filtered slice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Total COGS over the filtered days
    pub cogs: f64,
    /// Total revenue over the filtered days
    pub revenue: f64,
    /// Mean daily GCR (None when no days are in range)
    pub avg_gcr: Option<f64>,
    /// Mean daily margin fraction (None when no day has positive revenue)
    pub margin_pct: Option<f64>,
    /// Number of days in range
    pub days: usize,
}

/// Aggregated figures for one site or one customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub key: String,
    pub cogs: f64,
    pub rev: f64,
    pub avg_gcr: f64,
    pub margin: f64,
    pub margin_pct: Option<f64>,
}

/// Aggregated figures for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_id: String,
    pub product_name: String,
    pub is_generic: bool,
    pub qty: f64,
    pub cogs: f64,
    pub rev: f64,
    pub margin: f64,
    pub margin_pct: Option<f64>,
}

/// Margin fraction, undefined when revenue is not positive
pub fn margin_fraction(margin: f64, revenue: f64) -> Option<f64> {
    if revenue > 0.0 {
        Some(margin / revenue)
    } else {
        None
    }
}
