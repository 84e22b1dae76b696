//! Dashboard filter builder
//!
//! Mirrors the dashboard sidebar: a date range plus site, customer, product
//! and product-type selections. A `None` selection means "everything".

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::models::{DailySummary, LineItem, ProductType};

/// Builder for a dashboard selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardFilter {
    /// Inclusive date range (defaults to the daily summary bounds)
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub sites: Option<Vec<String>>,
    pub customers: Option<Vec<String>>,
    /// Product names
    pub products: Option<Vec<String>>,
    #[serde(default)]
    pub product_type: ProductType,
}

/// Filtered view of the dataset
#[derive(Debug, Clone, Default)]
pub struct FilteredSlice<'a> {
    /// Line items passing every selection
    pub line_items: Vec<&'a LineItem>,
    /// Daily summary rows within the date range (date is the only daily filter)
    pub daily: Vec<&'a DailySummary>,
}

/// Filter with every selection made explicit against a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFilter {
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub sites: Vec<String>,
    pub customers: Vec<String>,
    pub products: Vec<String>,
    pub product_type: ProductType,
}

impl DashboardFilter {
    /// Create a new filter builder (no restrictions)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inclusive date range
    pub fn date_range(mut self, range: Option<(NaiveDate, NaiveDate)>) -> Self {
        self.date_range = range;
        self
    }

    /// Set the date range from optional bounds, filling a missing bound from
    /// the dataset's daily summary
    pub fn open_range(
        self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        dataset: &Dataset,
    ) -> Self {
        if from.is_none() && to.is_none() {
            return self.date_range(None);
        }
        let bounds = dataset.date_bounds();
        let start = from.or(bounds.map(|b| b.0));
        let end = to.or(bounds.map(|b| b.1));
        match (start, end) {
            (Some(start), Some(end)) => self.date_range(Some((start, end))),
            _ => self.date_range(None),
        }
    }

    /// Restrict to the given sites
    pub fn sites(mut self, sites: Option<Vec<String>>) -> Self {
        self.sites = sites;
        self
    }

    /// Restrict to the given customer ids
    pub fn customers(mut self, customers: Option<Vec<String>>) -> Self {
        self.customers = customers;
        self
    }

    /// Restrict to the given product names
    pub fn products(mut self, products: Option<Vec<String>>) -> Self {
        self.products = products;
        self
    }

    /// Set the product type selection
    pub fn product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = product_type;
        self
    }

    /// Reject inverted date ranges
    pub fn validate(&self) -> Result<()> {
        if let Some((from, to)) = self.date_range {
            if from > to {
                return Err(Error::InvalidData(format!(
                    "Date range start {} is after end {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    /// Effective date range against a dataset
    pub fn effective_range(&self, dataset: &Dataset) -> Option<(NaiveDate, NaiveDate)> {
        self.date_range.or_else(|| dataset.date_bounds())
    }

    /// Apply the filter to a dataset
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Result<FilteredSlice<'a>> {
        self.validate()?;

        let range = self.effective_range(dataset);
        let in_range = |date: NaiveDate| match range {
            Some((from, to)) => date >= from && date <= to,
            None => true,
        };

        let sites = selection(&self.sites);
        let customers = selection(&self.customers);
        let products = selection(&self.products);

        let line_items = dataset
            .line_items
            .iter()
            .filter(|item| in_range(item.date))
            .filter(|item| sites.as_ref().map_or(true, |s| s.contains(item.site.as_str())))
            .filter(|item| {
                customers
                    .as_ref()
                    .map_or(true, |c| c.contains(item.customer_id.as_str()))
            })
            .filter(|item| {
                products
                    .as_ref()
                    .map_or(true, |p| p.contains(item.product_name.as_str()))
            })
            .filter(|item| self.product_type.matches(item.is_generic))
            .collect();

        let daily = dataset.daily.iter().filter(|d| in_range(d.date)).collect();

        Ok(FilteredSlice { line_items, daily })
    }

    /// Make every selection explicit (all values where a selection is `None`)
    pub fn resolve(&self, dataset: &Dataset) -> ResolvedFilter {
        let range = self.effective_range(dataset);
        ResolvedFilter {
            date_start: range.map(|r| r.0),
            date_end: range.map(|r| r.1),
            sites: self.sites.clone().unwrap_or_else(|| dataset.sites()),
            customers: self.customers.clone().unwrap_or_else(|| dataset.customers()),
            products: self.products.clone().unwrap_or_else(|| dataset.products()),
            product_type: self.product_type,
        }
    }
}

fn selection(values: &Option<Vec<String>>) -> Option<HashSet<&str>> {
    values
        .as_ref()
        .map(|v| v.iter().map(String::as_str).collect())
}
