//! In-memory dataset snapshot and its process-wide cache
//!
//! The dataset is read once from a directory of CSV exports and never
//! refreshed. `DatasetCache` holds the single loaded copy; the only way to
//! pick up new data is to restart the process.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;
use tracing::info;

use crate::error::{Error, Result};
use crate::import::{parse_daily_summary, parse_data_dictionary, parse_line_items};
use crate::models::{DailySummary, DictionaryEntry, LineItem};

/// File name of the line items table
pub const LINE_ITEMS_FILE: &str = "line_items.csv";
/// File name of the daily summary table
pub const DAILY_SUMMARY_FILE: &str = "daily_summary.csv";
/// File name of the (optional) data dictionary table
pub const DATA_DICTIONARY_FILE: &str = "data_dictionary.csv";

/// Static table snapshot: line items, daily summary and data dictionary
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub line_items: Vec<LineItem>,
    pub daily: Vec<DailySummary>,
    pub dictionary: Vec<DictionaryEntry>,
}

impl Dataset {
    /// Build a dataset from already-parsed tables
    pub fn new(
        line_items: Vec<LineItem>,
        mut daily: Vec<DailySummary>,
        dictionary: Vec<DictionaryEntry>,
    ) -> Self {
        daily.sort_by_key(|d| d.date);
        Self {
            line_items,
            daily,
            dictionary,
        }
    }

    /// Parse a dataset from CSV readers
    pub fn from_readers<L: Read, D: Read>(
        line_items: L,
        daily: D,
        dictionary: Option<Box<dyn Read>>,
    ) -> Result<Self> {
        let line_items = parse_line_items(line_items)?;
        let daily = parse_daily_summary(daily)?;
        let dictionary = match dictionary {
            Some(reader) => parse_data_dictionary(reader)?,
            None => Vec::new(),
        };
        Ok(Self::new(line_items, daily, dictionary))
    }

    /// Load the dataset from a directory of CSV exports
    pub fn load(dir: &Path) -> Result<Self> {
        let line_items = open_table(dir, LINE_ITEMS_FILE)?;
        let daily = open_table(dir, DAILY_SUMMARY_FILE)?;

        let dict_path = dir.join(DATA_DICTIONARY_FILE);
        let dictionary: Option<Box<dyn Read>> = if dict_path.exists() {
            Some(Box::new(File::open(&dict_path)?))
        } else {
            None
        };

        let dataset = Self::from_readers(line_items, daily, dictionary)?;
        info!(
            dir = %dir.display(),
            line_items = dataset.line_items.len(),
            days = dataset.daily.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// First and last date of the daily summary (None when empty)
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.daily.first()?.date;
        let last = self.daily.last()?.date;
        Some((first, last))
    }

    /// Sorted distinct site names
    pub fn sites(&self) -> Vec<String> {
        distinct(self.line_items.iter().map(|i| i.site.as_str()))
    }

    /// Sorted distinct customer ids
    pub fn customers(&self) -> Vec<String> {
        distinct(self.line_items.iter().map(|i| i.customer_id.as_str()))
    }

    /// Sorted distinct product names
    pub fn products(&self) -> Vec<String> {
        distinct(self.line_items.iter().map(|i| i.product_name.as_str()))
    }

    /// Description of a column from the data dictionary
    pub fn describe(&self, field: &str) -> Option<&str> {
        self.dictionary
            .iter()
            .find(|e| e.field.eq_ignore_ascii_case(field))
            .map(|e| e.description.as_str())
    }
}

fn open_table(dir: &Path, name: &str) -> Result<File> {
    let path = dir.join(name);
    if !path.exists() {
        return Err(Error::NotFound(format!("{} (in {})", name, dir.display())));
    }
    Ok(File::open(path)?)
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Single-initialization dataset cache
///
/// The first successful `get_or_load` fixes the dataset for the lifetime of
/// the cache. Later calls return the same `Arc`, even for a different
/// directory. A failed load leaves the cache empty so the next call retries.
#[derive(Debug, Default)]
pub struct DatasetCache {
    cell: OnceLock<(PathBuf, Arc<Dataset>)>,
}

impl DatasetCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the cached dataset, loading it from `dir` on first use
    pub fn get_or_load(&self, dir: &Path) -> Result<Arc<Dataset>> {
        if let Some((loaded_from, dataset)) = self.cell.get() {
            if loaded_from != dir {
                tracing::debug!(
                    cached = %loaded_from.display(),
                    requested = %dir.display(),
                    "Dataset already loaded; ignoring new directory"
                );
            }
            return Ok(dataset.clone());
        }

        let dataset = Arc::new(Dataset::load(dir)?);
        // A concurrent loader may have won the race; either copy is identical
        let (_, cached) = self.cell.get_or_init(|| (dir.to_path_buf(), dataset));
        Ok(cached.clone())
    }

    /// The cached dataset, if already loaded
    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.cell.get().map(|(_, d)| d.clone())
    }
}

/// Process-wide dataset cache
pub fn global_cache() -> &'static DatasetCache {
    static CACHE: DatasetCache = DatasetCache::new();
    &CACHE
}
