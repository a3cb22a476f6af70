//! Amount formatting and input filtering.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currencies displayed without fractional digits.
pub const NO_DECIMAL_CURRENCIES: &[&str] = &["JPY", "KRW", "IDR", "VND"];

/// Returned by [`format_amount`] for NaN and infinite values.
pub const FORMAT_FALLBACK: &str = "0.00";

/// Number of fractional digits shown for a currency.
pub fn decimal_places(code: &str) -> u32 {
    if NO_DECIMAL_CURRENCIES.contains(&code) {
        0
    } else {
        2
    }
}

/// Format an amount with thousands grouping and the currency's decimal policy.
///
/// Rounds half away from zero on the shortest decimal form of `amount`, so
/// `1.005` renders as `1.01`. No currency symbol is added.
pub fn format_amount(amount: f64, code: &str) -> String {
    if !amount.is_finite() {
        return FORMAT_FALLBACK.to_string();
    }

    let places = decimal_places(code);
    let digits = match amount.abs().to_string().parse::<Decimal>() {
        Ok(value) => {
            let mut rounded =
                value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(places);
            rounded.to_string()
        }
        // Outside Decimal's range.
        Err(_) => format!("{:.*}", places as usize, amount.abs()),
    };

    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let is_zero = digits.chars().all(|c| c == '0' || c == '.');
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Whether `text` is an acceptable in-progress amount entry.
///
/// Accepts the empty string or optional digits, an optional single decimal
/// point, then optional digits. Front ends apply this to every keystroke
/// before handing the text to the converter.
pub fn is_amount_input(text: &str) -> bool {
    let mut seen_point = false;
    for ch in text.chars() {
        match ch {
            '0'..='9' => {}
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    true
}
