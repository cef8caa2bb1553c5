//! Storefront money formatting
//!
//! Prices arrive from markup in minor units (cents). The shop's money
//! format is a template with one placeholder, e.g. `"${{amount}}"` or
//! `"{{amount_with_comma_separator}} €"`.

/// Format `cents` according to a money format template.
///
/// Supported placeholders:
/// - `{{amount}}` - `1,234.56`
/// - `{{amount_no_decimals}}` - `1,235` (rounded)
/// - `{{amount_with_comma_separator}}` - `1.234,56`
/// - `{{amount_no_decimals_with_comma_separator}}` - `1.235`
///
/// A template without a known placeholder is returned unchanged.
pub fn format_money(cents: i64, template: &str) -> String {
    let mut out = template.to_string();
    let substitutions = [
        (
            "{{amount_no_decimals_with_comma_separator}}",
            amount_no_decimals(cents, '.'),
        ),
        (
            "{{amount_with_comma_separator}}",
            amount(cents, '.', ','),
        ),
        ("{{amount_no_decimals}}", amount_no_decimals(cents, ',')),
        ("{{amount}}", amount(cents, ',', '.')),
    ];
    for (placeholder, value) in substitutions {
        if out.contains(placeholder) {
            out = out.replace(placeholder, &value);
        }
    }
    out
}

fn amount(cents: i64, thousands: char, decimal: char) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!(
        "{sign}{}{decimal}{:02}",
        group(abs / 100, thousands),
        abs % 100
    )
}

fn amount_no_decimals(cents: i64, thousands: char) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    // Round half away from zero.
    let rounded = (cents.unsigned_abs() + 50) / 100;
    format!("{sign}{}", group(rounded, thousands))
}

fn group(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}
