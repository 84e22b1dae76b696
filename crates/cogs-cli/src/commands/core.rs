//! Shared utilities for the data commands
//!
//! This module contains:
//! - `load_config` - Resolve configuration with CLI overrides
//! - `load_dataset` - Load the dataset once per process
//! - `build_filter` - Turn filter flags into a `DashboardFilter`

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use cogs_core::import::parse_date;
use cogs_core::{global_cache, AgentConfig, DashboardFilter, Dataset, ProductType};
use tracing::debug;

use crate::cli::FilterArgs;

/// Load configuration, letting `--data-dir` win over file and environment
pub fn load_config(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<AgentConfig> {
    let mut config = AgentConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(dir) = data_dir {
        config.data_dir = dir.to_path_buf();
    }
    debug!(
        source = ?config.source,
        data_dir = %config.data_dir.display(),
        model = %config.model,
        "Configuration loaded"
    );
    Ok(config)
}

/// Load the dataset through the process-wide cache
pub fn load_dataset(config: &AgentConfig) -> Result<Arc<Dataset>> {
    global_cache()
        .get_or_load(&config.data_dir)
        .with_context(|| format!("Failed to load dataset from {}", config.data_dir.display()))
}

/// Build a dashboard filter from CLI flags
///
/// Empty repeatable flags mean "no restriction".
pub fn build_filter(args: &FilterArgs, dataset: &Dataset) -> Result<DashboardFilter> {
    let from = args
        .from
        .as_deref()
        .map(parse_date)
        .transpose()
        .context("Invalid --from date format (use YYYY-MM-DD)")?;
    let to = args
        .to
        .as_deref()
        .map(parse_date)
        .transpose()
        .context("Invalid --to date format (use YYYY-MM-DD)")?;

    let product_type: ProductType = args
        .product_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let filter = DashboardFilter::new()
        .open_range(from, to, dataset)
        .sites(non_empty(&args.sites))
        .customers(non_empty(&args.customers))
        .products(non_empty(&args.products))
        .product_type(product_type);

    filter.validate()?;
    Ok(filter)
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

/// One-line description of the selection for report headers
pub fn describe_filter(filter: &DashboardFilter, dataset: &Dataset) -> String {
    let mut parts = Vec::new();

    match filter.effective_range(dataset) {
        Some((from, to)) => parts.push(format!("{} to {}", from, to)),
        None => parts.push("no dates".to_string()),
    }
    if let Some(sites) = &filter.sites {
        parts.push(format!("sites: {}", sites.join(", ")));
    }
    if let Some(customers) = &filter.customers {
        parts.push(format!("customers: {}", customers.join(", ")));
    }
    if let Some(products) = &filter.products {
        parts.push(format!("products: {}", products.join(", ")));
    }
    if filter.product_type != ProductType::All {
        parts.push(filter.product_type.label().to_string());
    }

    parts.join(" · ")
}
