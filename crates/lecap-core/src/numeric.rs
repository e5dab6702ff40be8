//! Locale-tolerant number parsing for spreadsheet cells.
//!
//! Cells come from a spreadsheet export whose locale is not guaranteed, so the
//! same column may hold `$ 1.234,56`, `1,234.56` or `12%`. The separator rule
//! is fixed:
//!
//! | Input shape | Interpretation |
//! |-------------|----------------|
//! | commas, no dot | `,` is the decimal point (`1,234` → `1.234`) |
//! | both, comma last | `.` removed as thousands, `,` is the decimal point (`1.234,56`) |
//! | both, dot last | `,` removed as thousands (`1,234.56`) |
//! | dots only, or neither | parsed as is |
//!
//! `"1,234"` is therefore `1.234`, not `1234`. The rule matches the source
//! spreadsheet's locale and is kept even where it is ambiguous.

/// Parse a loosely formatted number, returning `None` for blanks and garbage.
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let mut cleaned: String = raw
        .chars()
        .filter(|ch| !matches!(ch, '%' | '$') && !ch.is_whitespace())
        .collect();

    cleaned = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(_), None) => cleaned.replace(',', "."),
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        _ => cleaned.replace(',', ""),
    };

    to_finite(&cleaned)
}

/// Convenience wrapper over [`parse_number`] for a borrowed cell.
pub fn parse_number_str(raw: &str) -> Option<f64> {
    parse_number(Some(raw))
}

/// Normalize a rate-like value to a fraction.
///
/// Values above `1` are read as percentages (`45.5` → `0.455`); anything else
/// is assumed to already be fractional.
pub fn normalize_rate(value: Option<f64>) -> Option<f64> {
    value.map(|v| if v > 1.0 { v / 100.0 } else { v })
}

fn to_finite(cleaned: &str) -> Option<f64> {
    // An empty remainder (e.g. a lone "$") is not a number.
    if cleaned.is_empty() {
        return None;
    }
    let value = cleaned.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}
