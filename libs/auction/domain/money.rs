//! Shared currency-formatting contract
//!
//! Every displayed price (feed updates, bid-form messages, and the page's
//! static currency spans) renders as a dollar amount with exactly two
//! decimal places and `es`-style separators: thousands `.`, decimal `,`.
//! `$1234.5` therefore displays as `$1.234,50`.

/// Format an amount with two decimals and `es`-style separators
///
/// `1234.5` -> `"1.234,50"`
pub fn format_amount(value: f64) -> String {
    // Round to cents first so 99.999 carries into the integer part
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{},{:02}", sign, grouped, frac)
}

/// Format an amount as displayed currency text
///
/// `1234.5` -> `"$1.234,50"`
pub fn format_currency(value: f64) -> String {
    format!("${}", format_amount(value))
}

/// Leniently extract a numeric amount from display text
///
/// Strips everything except digits and `.`, then parses. Returns `None`
/// when nothing numeric remains, when the text carries a `,` (already
/// display-formatted, `,` is the decimal marker there), or when more than
/// one `.` survives (grouping dots, not a decimal point).
pub fn parse_amount(text: &str) -> Option<f64> {
    if text.contains(',') {
        return None;
    }
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if cleaned.matches('.').count() > 1 {
        return None;
    }
    cleaned.parse().ok()
}

/// Re-render the numeric portion of a static price span
///
/// Finds the first run of digits and dots in the text, parses it, and
/// replaces that run with the two-decimal formatted amount, leaving any
/// surrounding text (currency sign, labels) untouched. Text with no
/// parseable amount is returned unchanged.
pub fn reformat_text(text: &str) -> String {
    let start = match text.find(|c: char| c.is_ascii_digit()) {
        Some(i) => i,
        None => return text.to_string(),
    };
    let end = text[start..]
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .map(|i| start + i)
        .unwrap_or(text.len());

    let run = &text[start..end];
    match run.parse::<f64>() {
        Ok(value) => format!("{}{}{}", &text[..start], format_amount(value), &text[end..]),
        Err(_) => text.to_string(),
    }
}
