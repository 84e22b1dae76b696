//! Context Assembler
//!
//! Builds the compact document handed to the insight generator: the resolved
//! dashboard selection, a headline of aggregates, and small samples of the
//! daily series and the top-level groupings.
//!
//! Every numeric field is optional on the wire so that partially filled
//! documents (hand-written JSON, older exports) still deserialize. Read
//! values through the accessor methods, which apply the documented defaults.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::DashboardFilter;
use crate::report;

/// Default number of trailing days sampled into the context
pub const DEFAULT_DAILY_SAMPLE_DAYS: usize = 21;

/// Context document for the insight generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    #[serde(default)]
    pub date_start: Option<NaiveDate>,
    #[serde(default)]
    pub date_end: Option<NaiveDate>,
    #[serde(default)]
    pub sites: Vec<String>,
    #[serde(default)]
    pub customers: Vec<String>,
    #[serde(default)]
    pub products: Vec<String>,
    /// Product type label ("All", "Generic only", "Brand only")
    #[serde(default)]
    pub generic_filter: String,
    #[serde(default)]
    pub headline: Headline,
    #[serde(default)]
    pub samples: Samples,
}

/// Aggregates over the filtered daily rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    #[serde(default)]
    pub cogs_sum: Option<f64>,
    #[serde(default)]
    pub rev_sum: Option<f64>,
    #[serde(default)]
    pub avg_gcr: Option<f64>,
    #[serde(default)]
    pub avg_margin_pct: Option<f64>,
}

impl Headline {
    /// Total COGS (default 0.0)
    pub fn cogs_sum(&self) -> f64 {
        self.cogs_sum.unwrap_or(0.0)
    }

    /// Total revenue (default 0.0)
    pub fn rev_sum(&self) -> f64 {
        self.rev_sum.unwrap_or(0.0)
    }

    /// Mean daily GCR (default 0.0)
    pub fn avg_gcr(&self) -> f64 {
        self.avg_gcr.unwrap_or(0.0)
    }

    /// Mean daily margin fraction (default 0.0)
    pub fn avg_margin_pct(&self) -> f64 {
        self.avg_margin_pct.unwrap_or(0.0)
    }
}

/// Sampled rows included in the context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Samples {
    #[serde(default)]
    pub daily: Vec<DailySample>,
    #[serde(default)]
    pub sites: Vec<SiteSample>,
    #[serde(default)]
    pub customers: Vec<CustomerSample>,
    #[serde(default)]
    pub products: Vec<ProductSample>,
}

/// One day of the daily series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySample {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub daily_cogs: Option<f64>,
    #[serde(default)]
    pub daily_rev: Option<f64>,
    #[serde(default)]
    pub avg_gcr: Option<f64>,
    #[serde(default)]
    pub margin_dollars: Option<f64>,
    #[serde(default)]
    pub margin_pct: Option<f64>,
}

impl DailySample {
    /// Cost of the day (default 0.0)
    pub fn cogs(&self) -> f64 {
        self.daily_cogs.unwrap_or(0.0)
    }

    /// Generic-content ratio of the day (default 0.0)
    pub fn ratio(&self) -> f64 {
        self.avg_gcr.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSample {
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub cogs: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerSample {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub cogs: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSample {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub cogs: f64,
}

/// Assembles an `AgentContext` from a dataset and a dashboard selection
pub struct ContextBuilder<'a> {
    dataset: &'a Dataset,
    daily_sample_days: usize,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            daily_sample_days: DEFAULT_DAILY_SAMPLE_DAYS,
        }
    }

    /// Number of trailing filtered days to include in `samples.daily`
    pub fn daily_sample_days(mut self, days: usize) -> Self {
        self.daily_sample_days = days;
        self
    }

    /// Build the context for a selection
    pub fn build(&self, filter: &DashboardFilter) -> Result<AgentContext> {
        let slice = filter.apply(self.dataset)?;
        let resolved = filter.resolve(self.dataset);

        let kpis = report::kpis(&slice);
        let headline = Headline {
            cogs_sum: Some(kpis.cogs),
            rev_sum: Some(kpis.revenue),
            avg_gcr: Some(kpis.avg_gcr.unwrap_or(0.0)),
            avg_margin_pct: Some(kpis.margin_pct.unwrap_or(0.0)),
        };

        let rows = report::daily_rows(&slice);
        let skip = rows.len().saturating_sub(self.daily_sample_days);
        let daily = rows
            .into_iter()
            .skip(skip)
            .map(|r| DailySample {
                date: Some(r.date),
                daily_cogs: Some(r.daily_cogs),
                daily_rev: Some(r.daily_rev),
                avg_gcr: Some(r.avg_gcr),
                margin_dollars: Some(r.margin_dollars),
                margin_pct: r.margin_pct,
            })
            .collect();

        let mut sites: BTreeMap<&str, f64> = BTreeMap::new();
        let mut customers: BTreeMap<&str, f64> = BTreeMap::new();
        let mut products: BTreeMap<(&str, &str), f64> = BTreeMap::new();
        for item in &slice.line_items {
            *sites.entry(item.site.as_str()).or_default() += item.extended_cogs;
            *customers.entry(item.customer_id.as_str()).or_default() += item.extended_cogs;
            *products
                .entry((item.product_id.as_str(), item.product_name.as_str()))
                .or_default() += item.extended_cogs;
        }

        let samples = Samples {
            daily,
            sites: sites
                .into_iter()
                .map(|(site, cogs)| SiteSample {
                    site: site.to_string(),
                    cogs,
                })
                .collect(),
            customers: customers
                .into_iter()
                .map(|(customer_id, cogs)| CustomerSample {
                    customer_id: customer_id.to_string(),
                    cogs,
                })
                .collect(),
            products: products
                .into_iter()
                .map(|((product_id, product_name), cogs)| ProductSample {
                    product_id: product_id.to_string(),
                    product_name: product_name.to_string(),
                    cogs,
                })
                .collect(),
        };

        Ok(AgentContext {
            date_start: resolved.date_start,
            date_end: resolved.date_end,
            sites: resolved.sites,
            customers: resolved.customers,
            products: resolved.products,
            generic_filter: resolved.product_type.label().to_string(),
            headline,
            samples,
        })
    }
}
