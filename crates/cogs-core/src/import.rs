//! CSV parsers for the dataset tables
//!
//! The source workbook has three sheets, each exported as its own CSV file:
//! `line_items`, `daily_summary` and `data_dictionary`. Columns are located by
//! header name, so column order in the export does not matter.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{DailySummary, DictionaryEntry, LineItem};

/// Header → column index lookup for one CSV table
struct Columns {
    table: &'static str,
    headers: StringRecord,
}

impl Columns {
    fn new(table: &'static str, headers: StringRecord) -> Self {
        Self { table, headers }
    }

    /// Index of a required column (matched case-insensitively)
    fn index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                Error::Dataset(format!("{}: missing column '{}'", self.table, name))
            })
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize, name: &str, line: usize) -> Result<&'r str> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| Error::Dataset(format!("row {}: missing value for '{}'", line, name)))
}

/// Parse the line items table
///
/// Format: date,site,customer_id,product_id,product_name,is_generic,qty,extended_cogs,extended_revenue,GCR
pub fn parse_line_items<R: Read>(reader: R) -> Result<Vec<LineItem>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let cols = Columns::new("line_items", rdr.headers()?.clone());
    let date_i = cols.index("date")?;
    let site_i = cols.index("site")?;
    let customer_i = cols.index("customer_id")?;
    let product_id_i = cols.index("product_id")?;
    let product_name_i = cols.index("product_name")?;
    let generic_i = cols.index("is_generic")?;
    let qty_i = cols.index("qty")?;
    let cogs_i = cols.index("extended_cogs")?;
    let rev_i = cols.index("extended_revenue")?;
    let gcr_i = cols.index("GCR")?;

    let mut items = Vec::new();

    for (n, result) in rdr.records().enumerate() {
        let record = result?;
        let line = n + 2;

        items.push(LineItem {
            date: parse_date(field(&record, date_i, "date", line)?)?,
            site: field(&record, site_i, "site", line)?.to_string(),
            customer_id: field(&record, customer_i, "customer_id", line)?.to_string(),
            product_id: field(&record, product_id_i, "product_id", line)?.to_string(),
            product_name: field(&record, product_name_i, "product_name", line)?.to_string(),
            is_generic: parse_bool(field(&record, generic_i, "is_generic", line)?)?,
            qty: parse_number(field(&record, qty_i, "qty", line)?)?,
            extended_cogs: parse_number(field(&record, cogs_i, "extended_cogs", line)?)?,
            extended_revenue: parse_number(field(&record, rev_i, "extended_revenue", line)?)?,
            gcr: parse_number(field(&record, gcr_i, "GCR", line)?)?,
        });
    }

    debug!("Parsed {} line items", items.len());
    Ok(items)
}

/// Parse the daily summary table
///
/// Format: date,daily_cogs,daily_rev,avg_gcr
pub fn parse_daily_summary<R: Read>(reader: R) -> Result<Vec<DailySummary>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let cols = Columns::new("daily_summary", rdr.headers()?.clone());
    let date_i = cols.index("date")?;
    let cogs_i = cols.index("daily_cogs")?;
    let rev_i = cols.index("daily_rev")?;
    let gcr_i = cols.index("avg_gcr")?;

    let mut rows = Vec::new();

    for (n, result) in rdr.records().enumerate() {
        let record = result?;
        let line = n + 2;

        rows.push(DailySummary {
            date: parse_date(field(&record, date_i, "date", line)?)?,
            daily_cogs: parse_number(field(&record, cogs_i, "daily_cogs", line)?)?,
            daily_rev: parse_number(field(&record, rev_i, "daily_rev", line)?)?,
            avg_gcr: parse_number(field(&record, gcr_i, "avg_gcr", line)?)?,
        });
    }

    debug!("Parsed {} daily summary rows", rows.len());
    Ok(rows)
}

/// Parse the data dictionary table
///
/// Format: field,description
pub fn parse_data_dictionary<R: Read>(reader: R) -> Result<Vec<DictionaryEntry>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let cols = Columns::new("data_dictionary", rdr.headers()?.clone());
    let field_i = cols.index("field")?;
    let desc_i = cols.index("description")?;

    let mut entries = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let name = record.get(field_i).map(str::trim).unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        entries.push(DictionaryEntry {
            field: name.to_string(),
            description: record
                .get(desc_i)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        });
    }

    Ok(entries)
}

/// Parse a date, accepting an optional trailing time component
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    // Spreadsheet exports often write datetimes ("2024-01-15 00:00:00")
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    Err(Error::Dataset(format!("Unable to parse date: {}", s)))
}

/// Parse a boolean flag (true/false, 1/0, yes/no)
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(Error::Dataset(format!("Unable to parse boolean: {}", s))),
    }
}

/// Parse a finite number, tolerating currency symbols and thousands separators
pub fn parse_number(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();

    let value: f64 = cleaned
        .parse()
        .map_err(|_| Error::Dataset(format!("Unable to parse number: {}", s)))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::Dataset(format!("Non-finite number: {}", s)))
    }
}
