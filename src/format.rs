//! Number formatters for use as column renderers.
//!
//! A formatter takes the cell data and returns what to display. Values that
//! are null or not numbers are passed through unchanged.

use std::sync::Arc;

use crate::value::{Value, format_number};

pub type Formatter = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Applies `format` to the numeric form of `value`. Nulls and values that do
/// not read as a number are returned as they are.
pub fn safe_format(value: &Value, format: impl Fn(f64) -> String) -> Value {
    match value.to_number() {
        Some(n) => Value::Text(format(n)),
        _ => value.clone(),
    }
}

/// Treats zero as null so zeros render as empty cells.
pub fn zero_as_null(formatter: Formatter) -> Formatter {
    Arc::new(move |value: &Value| {
        if value.as_f64() == Some(0.0) {
            formatter(&Value::Null)
        } else {
            formatter(value)
        }
    })
}

/// Prefixes positive values with `+`.
pub fn make_plus_minus(formatter: Formatter) -> Formatter {
    Arc::new(move |value: &Value| {
        let formatted = formatter(value);
        match value.to_number() {
            Some(n) if n > 0.0 => Value::Text(format!("+{formatted}")),
            _ => formatted,
        }
    })
}

/// Multiplies by 100 before formatting and appends `%`.
pub fn make_percent(formatter: Formatter) -> Formatter {
    Arc::new(move |value: &Value| match value.to_number() {
        Some(n) => Value::Text(format!("{}%", formatter(&Value::from(n * 100.0)))),
        _ => formatter(value),
    })
}

fn fixed(n: f64, decimals: usize) -> String {
    let formatted = format!("{n:.decimals$}");
    // "-0.0" reads as zero
    match formatted.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => formatted,
    }
}

fn group_thousands(integer: &str) -> String {
    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }
    grouped
}

// Inserts thousands separators into an already formatted unsigned number.
fn with_commas(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((integer, fraction)) => format!("{}.{fraction}", group_thousands(integer)),
        None => group_thousands(formatted),
    }
}

/// Fixed number of decimals: `dec_format(1)` renders 10.89321 as `10.9`.
pub fn dec_format(decimals: usize) -> Formatter {
    Arc::new(move |value: &Value| safe_format(value, |n| fixed(n, decimals)))
}

/// Multiplied by 100 with a fixed number of decimals, without the `%`.
pub fn dec_percent_format(decimals: usize) -> Formatter {
    Arc::new(move |value: &Value| safe_format(value, |n| fixed(n * 100.0, decimals)))
}

/// Integers as they are, anything else with one decimal.
pub fn at_most_dec_format(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.fract() == 0.0 => value.clone(),
        _ => safe_format(value, |n| fixed(n, 1)),
    }
}

/// Percentage with a fixed number of decimals: 0.38523 is `38.5%`.
pub fn percent_format(decimals: usize) -> Formatter {
    Arc::new(move |value: &Value| safe_format(value, |n| format!("{}%", fixed(n * 100.0, decimals))))
}

/// Always signed: 0.38523 is `+0.4`, -15 is `-15.0`.
pub fn plus_minus_format(decimals: usize) -> Formatter {
    Arc::new(move |value: &Value| {
        safe_format(value, |n| {
            let formatted = fixed(n, decimals);
            if formatted.starts_with('-') {
                formatted
            } else {
                format!("+{formatted}")
            }
        })
    })
}

/// Standard error style, the absolute value prefixed with `±`.
pub fn se_format(decimals: usize) -> Formatter {
    Arc::new(move |value: &Value| safe_format(value, |n| format!("±{}", fixed(n.abs(), decimals))))
}

/// Pads with zeros and keeps the last `length` characters, `5` is `05` for length 2.
pub fn leading_zero_format(length: usize) -> Formatter {
    Arc::new(move |value: &Value| {
        if value.is_null() {
            return Value::Null;
        }
        let padded = format!("00000000{value}");
        let chars: Vec<char> = padded.chars().collect();
        let start = chars.len().saturating_sub(length);
        Value::Text(chars[start..].iter().collect())
    })
}

/// Dollars with thousands separators and cents: `$1,234.57`. Always two
/// decimals, where d3's `$,f` would print six (`$9.132000`).
pub fn money_format(value: &Value) -> Value {
    safe_format(value, |n| {
        let formatted = with_commas(&fixed(n.abs(), 2));
        if n < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
            format!("-${formatted}")
        } else {
            format!("${formatted}")
        }
    })
}

/// Thousands separators without rounding: 1234567.5 is `1,234,567.5`.
pub fn comma_format(value: &Value) -> Value {
    safe_format(value, |n| {
        let formatted = with_commas(&format_number(n.abs()));
        if n < 0.0 {
            format!("-{formatted}")
        } else {
            formatted
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: Value) -> String {
        value.to_key()
    }

    #[test]
    fn decimal_formats() {
        assert_eq!(text(dec_format(1)(&Value::from(10.89321))), "10.9");
        assert_eq!(text(dec_format(3)(&Value::from(10.89321))), "10.893");
        assert_eq!(text(dec_percent_format(1)(&Value::from(0.8132))), "81.3");
        assert_eq!(text(at_most_dec_format(&Value::from(15))), "15");
        assert_eq!(text(at_most_dec_format(&Value::from(15.001))), "15.0");
        assert_eq!(text(dec_format(1)(&Value::from("2.25x"))), "2.25x");
    }

    #[test]
    fn signed_and_percent_formats() {
        assert_eq!(text(percent_format(1)(&Value::from(0.38523))), "38.5%");
        assert_eq!(text(plus_minus_format(1)(&Value::from(0.38523))), "+0.4");
        assert_eq!(text(plus_minus_format(1)(&Value::from(-15))), "-15.0");
        assert_eq!(text(plus_minus_format(2)(&Value::from(0))), "+0.00");
        assert_eq!(text(se_format(2)(&Value::from(-15))), "±15.00");
    }

    #[test]
    fn nulls_pass_through() {
        for formatter in [dec_format(1), percent_format(0), se_format(1), leading_zero_format(2)] {
            assert_eq!(formatter(&Value::Null), Value::Null);
        }
        assert!(matches!(money_format(&Value::Number(f64::NAN)), Value::Number(n) if n.is_nan()));
        assert_eq!(comma_format(&Value::from("n/a")), Value::from("n/a"));
    }

    #[test]
    fn money_and_commas() {
        assert_eq!(text(money_format(&Value::from(9.132))), "$9.13");
        assert_eq!(text(money_format(&Value::from(1234.567))), "$1,234.57");
        assert_eq!(text(money_format(&Value::from(-1234567.0))), "-$1,234,567.00");
        assert_eq!(text(comma_format(&Value::from(1234567.5))), "1,234,567.5");
        assert_eq!(text(comma_format(&Value::from(-999))), "-999");
    }

    #[test]
    fn leading_zeros() {
        assert_eq!(text(leading_zero_format(2)(&Value::from(5))), "05");
        assert_eq!(text(leading_zero_format(2)(&Value::from(12))), "12");
        assert_eq!(text(leading_zero_format(4)(&Value::from("7"))), "0007");
    }

    #[test]
    fn wrappers() {
        let blank_zero = zero_as_null(dec_format(1));
        assert_eq!(blank_zero(&Value::from(0)), Value::Null);
        assert_eq!(text(blank_zero(&Value::from(2))), "2.0");

        let signed = make_plus_minus(dec_format(1));
        assert_eq!(text(signed(&Value::from(3))), "+3.0");
        assert_eq!(text(signed(&Value::from(-3))), "-3.0");

        let percent = make_percent(dec_format(0));
        assert_eq!(text(percent(&Value::from(0.25))), "25%");
        assert_eq!(percent(&Value::Null), Value::Null);
    }
}
