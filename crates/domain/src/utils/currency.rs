//! Brazilian real amounts: lenient parsing and display formatting.
//!
//! Amounts come from two places. The backend sends decimals as JSON numbers
//! or strings (`"120.00"`, sometimes `"120,00"`), and users type Brazilian
//! currency (`"R$ 1.234,56"`). Both paths end in plain `f64` reais.

/// Parse a backend decimal. Blank or unparseable input is `0.0`.
pub fn parse_decimal_value(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return 0.0;
    }

    cleaned.replacen(',', ".", 1).parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parse user-entered currency text.
///
/// Accepts an optional `R$` prefix. When a comma is present it is the
/// decimal separator and dots are thousands separators (`"1.234,56"`);
/// otherwise the text is read as a plain decimal (`"200"`, `"15.5"`).
/// Returns `None` for blank or unparseable text.
pub fn parse_currency(input: &str) -> Option<f64> {
    let stripped = input.trim().trim_start_matches("R$");
    let compact: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let normalized =
        if compact.contains(',') { compact.replace('.', "").replace(',', ".") } else { compact };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format reais as `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let integer = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{fraction:02}")
}
