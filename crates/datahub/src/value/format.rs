//! Text boundary for numeric fields.
//!
//! Numbers leave the hub through [`format_general`] (the `%g` convention) and
//! come back through [`parse_lenient`]. Both are locale independent, and each
//! formatted result is a fresh `String`, so nested or re-entrant conversions
//! never share a buffer.

use crate::config::HubConfig;

/// Formats `value` in general notation with [`HubConfig::FORMAT_PRECISION`]
/// significant digits.
///
/// Fixed notation is used when the decimal exponent lies in
/// `[-4, precision)`, scientific notation (`1.5e+07`) otherwise. Trailing
/// zeros of the fraction are removed in both forms.
///
/// ```
/// use datahub::format_general;
///
/// assert_eq!(format_general(10.0), "10");
/// assert_eq!(format_general(10.01), "10.01");
/// assert_eq!(format_general(1.0e6), "1e+06");
/// assert_eq!(format_general(0.0001), "0.0001");
/// ```
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    let precision = HubConfig::FORMAT_PRECISION;
    // Rounding to the requested significant digits can carry into the next
    // decade (999999.5 -> 1e+06), so the exponent is read after rounding.
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    let text = if exponent < HubConfig::MIN_FIXED_EXPONENT || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_owned()
    };

    debug_assert!(
        text.len() <= HubConfig::MAX_TEXT_WIDTH,
        "formatted number `{text}` exceeds the field text width"
    );
    text
}

/// Parses the longest numeric prefix of `text`, returning zero when there is none.
///
/// Leading whitespace is skipped. The prefix may carry a sign, a fraction and
/// an exponent, or be one of `inf`, `infinity`, `nan` in any case.
///
/// ```
/// use datahub::parse_lenient;
///
/// assert_eq!(parse_lenient("  12.5kg"), 12.5);
/// assert_eq!(parse_lenient("-3e2"), -300.0);
/// assert_eq!(parse_lenient("unittest"), 0.0);
/// ```
pub fn parse_lenient(text: &str) -> f64 {
    parse_prefix(text).unwrap_or_else(|| {
        tracing::debug!(text, "text has no numeric prefix, reading as zero");
        0.0
    })
}

/// Parses the longest numeric prefix of `text`, if any.
pub(crate) fn parse_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let is_digit = |index: usize| bytes.get(index).is_some_and(u8::is_ascii_digit);

    let mut end = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            end = 1;
            true
        }
        Some(b'+') => {
            end = 1;
            false
        }
        _ => false,
    };

    let rest = &s[end..];
    for word in ["infinity", "inf"] {
        if rest.get(..word.len()).is_some_and(|w| w.eq_ignore_ascii_case(word)) {
            return Some(if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            });
        }
    }
    if rest.get(..3).is_some_and(|w| w.eq_ignore_ascii_case("nan")) {
        return Some(f64::NAN);
    }

    let mut digits = 0;
    while is_digit(end) {
        end += 1;
        digits += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        let mut cursor = end + 1;
        let mut fraction = 0;
        while is_digit(cursor) {
            cursor += 1;
            fraction += 1;
        }
        if digits + fraction > 0 {
            end = cursor;
            digits += fraction;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut cursor = end + 1;
        if matches!(bytes.get(cursor), Some(b'+' | b'-')) {
            cursor += 1;
        }
        let exponent_start = cursor;
        while is_digit(cursor) {
            cursor += 1;
        }
        if cursor > exponent_start {
            end = cursor;
        }
    }

    s[..end].parse().ok()
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
