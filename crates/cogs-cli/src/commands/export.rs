//! Export command implementation

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use cogs_core::export::write_line_items_csv;
use cogs_core::{DashboardFilter, Dataset};

use super::describe_filter;

/// Write the filtered line items to a CSV file
pub fn cmd_export(dataset: &Dataset, filter: &DashboardFilter, output: &Path) -> Result<()> {
    let slice = filter.apply(dataset)?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let count = write_line_items_csv(BufWriter::new(file), &slice.line_items)
        .context("Failed to write CSV")?;

    println!("📤 Exported {} line items to {}", count, output.display());
    println!("   {}", describe_filter(filter, dataset));

    Ok(())
}
