//! Dashboard selection parsing shared by the handlers
//!
//! GET endpoints take the selection as query parameters with comma-separated
//! lists; the agent endpoint takes it as a JSON object with arrays. Both end
//! up as a `DashboardFilter`.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::AppError;
use cogs_core::import::parse_date;
use cogs_core::{DashboardFilter, Dataset, ProductType};

/// Query parameters for a dashboard selection
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    /// Start date (YYYY-MM-DD)
    pub from: Option<String>,
    /// End date (YYYY-MM-DD)
    pub to: Option<String>,
    /// Sites (comma-separated)
    pub sites: Option<String>,
    /// Customer ids (comma-separated)
    pub customers: Option<String>,
    /// Product names (comma-separated)
    pub products: Option<String>,
    /// all, generic or brand
    pub product_type: Option<String>,
}

/// JSON body form of a dashboard selection
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilterBody {
    pub from: Option<String>,
    pub to: Option<String>,
    pub sites: Option<Vec<String>>,
    pub customers: Option<Vec<String>>,
    pub products: Option<Vec<String>>,
    pub product_type: Option<String>,
}

impl FilterQuery {
    pub fn to_filter(&self, dataset: &Dataset) -> Result<DashboardFilter, AppError> {
        build_filter(
            self.from.as_deref(),
            self.to.as_deref(),
            self.sites.as_deref().map(split_list),
            self.customers.as_deref().map(split_list),
            self.products.as_deref().map(split_list),
            self.product_type.as_deref(),
            dataset,
        )
    }
}

impl FilterBody {
    pub fn to_filter(&self, dataset: &Dataset) -> Result<DashboardFilter, AppError> {
        build_filter(
            self.from.as_deref(),
            self.to.as_deref(),
            self.sites.clone(),
            self.customers.clone(),
            self.products.clone(),
            self.product_type.as_deref(),
            dataset,
        )
    }
}

/// Split a comma-separated list, dropping blank entries
///
/// An empty parameter (`sites=`) yields an empty selection, which matches
/// nothing, the same as clearing a multiselect.
fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bound(value: Option<&str>, name: &str) -> Result<Option<NaiveDate>, AppError> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(parse_date)
        .transpose()
        .map_err(|_| {
            AppError::bad_request(&format!(
                "Invalid '{}' date format (use YYYY-MM-DD)",
                name
            ))
        })
}

fn build_filter(
    from: Option<&str>,
    to: Option<&str>,
    sites: Option<Vec<String>>,
    customers: Option<Vec<String>>,
    products: Option<Vec<String>>,
    product_type: Option<&str>,
    dataset: &Dataset,
) -> Result<DashboardFilter, AppError> {
    let from = parse_bound(from, "from")?;
    let to = parse_bound(to, "to")?;

    let product_type = product_type
        .map(|s| s.parse::<ProductType>())
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?
        .unwrap_or_default();

    let filter = DashboardFilter::new()
        .open_range(from, to, dataset)
        .sites(sites)
        .customers(customers)
        .products(products)
        .product_type(product_type);

    filter
        .validate()
        .map_err(|e| AppError::bad_request(&e.to_string()))?;

    Ok(filter)
}
