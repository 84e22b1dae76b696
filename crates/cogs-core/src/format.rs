//! Display formatting for money and percentages

/// Format a dollar amount with thousands separators and no decimals
///
/// Negative amounts keep the sign after the currency symbol ("$-1,234").
pub fn format_currency(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let negative = amount < 0.0 && rounded != "0";
    format!(
        "${}{}",
        if negative { "-" } else { "" },
        group_thousands(&rounded)
    )
}

/// Format a fraction as a percentage with the given number of decimals (0.123 → "12.3%")
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}

/// Insert commas every three digits of an unsigned integer string
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
