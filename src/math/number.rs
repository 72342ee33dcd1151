//! Numeric answer parsing.
//!
//! Accepts the surface forms students type for a single number: signed
//! integers and decimals (with optional thousands separators), fractions
//! `a/b`, mixed numbers `a b/c` and percentages `n%`.

use std::sync::LazyLock;

use regex::Regex;

/// Unsigned decimal literal with optional thousands separators.
static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{1,3}(?:,\d{3})+|\d*)(?:\.\d*)?$").unwrap()
});

/// A number followed by a unit of measure: `5cm`, `12m`, `3.5kg`.
///
/// Single letters that usually name variables (`x`, `h`, `t`) are not units.
static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?[\d.%])\s?(mm|cm|km|m|mg|kg|g|ml|l|in|ft|yd|mi|lb|oz|sec|s|min|hr)$").unwrap()
});

/// A parsed numeric answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericValue {
    /// The value.
    pub value: f64,
    /// Digits after the decimal point when the answer was written as a
    /// rounded decimal (`0.33` → 2, `33%` → 2). `None` for exact forms.
    pub decimals: Option<u32>,
}

impl NumericValue {
    fn exact(value: f64) -> Self {
        Self {
            value,
            decimals: None,
        }
    }
}

/// Parse a normalized answer as a single number.
///
/// Returns `None` for anything that is not exactly one number.
pub fn parse_number(s: &str) -> Option<NumericValue> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(body) = s.strip_suffix('%') {
        let inner = parse_number(body)?;
        return Some(NumericValue {
            value: inner.value / 100.0,
            decimals: Some(inner.decimals.unwrap_or(0) + 2),
        });
    }

    let (negative, body) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let parsed = parse_unsigned(body)?;
    let value = if negative { -parsed.value } else { parsed.value };
    value.is_finite().then_some(NumericValue { value, ..parsed })
}

/// Parse a normalized answer as a number with an optional unit suffix.
///
/// Returns the number and the unit, if one was written.
pub fn parse_quantity(s: &str) -> Option<(NumericValue, Option<&str>)> {
    if let Some(number) = parse_number(s) {
        return Some((number, None));
    }
    let caps = QUANTITY_RE.captures(s.trim())?;
    let number = parse_number(caps.get(1)?.as_str())?;
    Some((number, Some(caps.get(2)?.as_str())))
}

fn parse_unsigned(s: &str) -> Option<NumericValue> {
    if let Some((whole, frac)) = s.split_once(' ') {
        let whole = parse_decimal(whole)?;
        let frac = parse_fraction(frac)?;
        if whole.decimals.is_some() {
            return None;
        }
        return Some(NumericValue::exact(whole.value + frac.value));
    }

    if s.contains('/') {
        return parse_fraction(s);
    }

    parse_decimal(s)
}

fn parse_fraction(s: &str) -> Option<NumericValue> {
    let (num, den) = s.split_once('/')?;
    let num = parse_decimal(num)?;
    let den = parse_decimal(den)?;
    if den.value == 0.0 {
        return None;
    }
    Some(NumericValue::exact(num.value / den.value))
}

fn parse_decimal(s: &str) -> Option<NumericValue> {
    if !s.bytes().any(|b| b.is_ascii_digit()) || !DECIMAL_RE.is_match(s) {
        return None;
    }

    let plain = s.replace(',', "");
    let value: f64 = plain.parse().ok()?;
    let decimals = plain
        .split_once('.')
        .map(|(_, frac)| frac.len() as u32)
        .filter(|d| *d > 0);

    Some(NumericValue { value, decimals })
}
