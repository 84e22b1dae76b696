//! CSV export of filtered line items
//!
//! Writes the same columns the dataset is loaded from, so an export can be
//! dropped back into a data directory as `line_items.csv`.

use std::io::Write;

use crate::error::Result;
use crate::models::LineItem;

/// Write line items as CSV with a header row
///
/// Returns the number of rows written (excluding the header).
pub fn write_line_items_csv<W: Write>(writer: W, items: &[&LineItem]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "date",
        "site",
        "customer_id",
        "product_id",
        "product_name",
        "is_generic",
        "qty",
        "extended_cogs",
        "extended_revenue",
        "GCR",
    ])?;

    for item in items {
        wtr.write_record([
            item.date.format("%Y-%m-%d").to_string(),
            item.site.clone(),
            item.customer_id.clone(),
            item.product_id.clone(),
            item.product_name.clone(),
            item.is_generic.to_string(),
            item.qty.to_string(),
            item.extended_cogs.to_string(),
            item.extended_revenue.to_string(),
            item.gcr.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(items.len())
}

/// Export line items to an in-memory CSV string
pub fn line_items_to_csv(items: &[&LineItem]) -> Result<String> {
    let mut buf = Vec::new();
    write_line_items_csv(&mut buf, items)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parse_line_items;
    use chrono::NaiveDate;

    fn item(site: &str, name: &str) -> LineItem {
        LineItem {
            date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            site: site.to_string(),
            customer_id: "C9".to_string(),
            product_id: "P1".to_string(),
            product_name: name.to_string(),
            is_generic: true,
            qty: 3.0,
            extended_cogs: 12.5,
            extended_revenue: 20.0,
            gcr: 0.75,
        }
    }

    #[test]
    fn test_export_header_and_rows() {
        let a = item("North", "Amoxicillin 500mg");
        let csv = line_items_to_csv(&[&a]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("date,site,customer_id,product_id,product_name,is_generic,qty,extended_cogs,extended_revenue,GCR")
        );
        assert_eq!(
            lines.next(),
            Some("2024-02-29,North,C9,P1,Amoxicillin 500mg,true,3,12.5,20,0.75")
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_export_quotes_commas_and_reloads() {
        let a = item("North, Annex", "Saline 0.9%");
        let b = item("South", "Gauze");
        let csv = line_items_to_csv(&[&a, &b]).unwrap();
        assert!(csv.contains("\"North, Annex\""));

        let reloaded = parse_line_items(csv.as_bytes()).unwrap();
        assert_eq!(reloaded, vec![a, b]);
    }

    #[test]
    fn test_export_empty() {
        let mut buf = Vec::new();
        let count = write_line_items_csv(&mut buf, &[]).unwrap();
        assert_eq!(count, 0);
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
