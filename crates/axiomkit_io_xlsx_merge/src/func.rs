//! Stateless helpers for template cell expressions.
//!
//! Absent input gives absent output throughout.

use std::fmt::{self, Write as _};

use chrono::{NaiveDate, NaiveDateTime};

use crate::spec::XlsxMergeError;

/// Format a date-time with a strftime pattern; `None` for an invalid pattern.
pub fn format_datetime(value: Option<&NaiveDateTime>, pattern: &str) -> Option<String> {
    let value = value?;
    let mut c_out = String::new();
    write!(c_out, "{}", value.format(pattern)).ok()?;
    Some(c_out)
}

/// Format a date with a strftime pattern; `None` for an invalid pattern.
pub fn format_date(value: Option<&NaiveDate>, pattern: &str) -> Option<String> {
    let value = value?;
    let mut c_out = String::new();
    write!(c_out, "{}", value.format(pattern)).ok()?;
    Some(c_out)
}

/// Round half away from zero to `scale` decimals.
///
/// Rounding works on the shortest decimal form of `value`, so `1.005` rounds to
/// `1.01` even though its binary value lies just below.
pub fn round_half_up(value: f64, scale: u32) -> f64 {
    let Ok(n_scale) = usize::try_from(scale) else {
        return value;
    };
    if !value.is_finite() {
        return value;
    }
    let (c_int, c_frac) = derive_rounded_digits(value, n_scale);
    let c_sign = if value.is_sign_negative() { "-" } else { "" };
    let c_text = if c_frac.is_empty() {
        format!("{c_sign}{c_int}")
    } else {
        format!("{c_sign}{c_int}.{c_frac}")
    };
    c_text.parse::<f64>().unwrap_or(value)
}

/// Format a number with a decimal pattern such as `0`, `0.00`, `#,##0.##`.
///
/// `0` marks a mandatory digit and `#` an optional one; a `,` anywhere in the
/// integer part turns on thousands grouping. Other characters are not supported
/// and the pattern is read as if they were absent. A result without any digit
/// is written as `0`.
pub fn format_number(value: Option<f64>, pattern: &str) -> Option<String> {
    let value = value?;
    if !value.is_finite() {
        return Some(value.to_string());
    }

    let (c_int_pattern, c_frac_pattern) = pattern.split_once('.').unwrap_or((pattern, ""));
    let if_grouping = c_int_pattern.contains(',');
    let n_int_min = c_int_pattern.chars().filter(|c| *c == '0').count();
    let n_frac_min = c_frac_pattern.chars().filter(|c| *c == '0').count();
    let n_frac_max = c_frac_pattern
        .chars()
        .filter(|c| *c == '0' || *c == '#')
        .count();

    let (c_int_raw, c_frac_raw) = derive_rounded_digits(value, n_frac_max);
    let if_zero = c_int_raw.chars().chain(c_frac_raw.chars()).all(|c| c == '0');

    let mut c_frac = c_frac_raw;
    while c_frac.len() > n_frac_min && c_frac.ends_with('0') {
        c_frac.pop();
    }
    let c_frac = format!("{c_frac:0<n_frac_min$}");

    let c_int_trimmed = c_int_raw.trim_start_matches('0');
    let c_int = if c_int_trimmed.len() < n_int_min {
        format!("{c_int_trimmed:0>n_int_min$}")
    } else {
        c_int_trimmed.to_string()
    };
    let c_int = if if_grouping {
        derive_grouped_digits(&c_int)
    } else {
        c_int
    };

    let mut c_out = String::new();
    if value < 0.0 && !if_zero {
        c_out.push('-');
    }
    c_out.push_str(&c_int);
    if !c_frac.is_empty() {
        c_out.push('.');
        c_out.push_str(&c_frac);
    }
    if c_int.is_empty() && c_frac.is_empty() {
        c_out.push('0');
    }
    Some(c_out)
}

/// Integer and fraction digits of `|value|` rounded half-up to at most `scale`
/// fraction digits. The fraction is not padded.
fn derive_rounded_digits(value: f64, scale: usize) -> (String, String) {
    let c_plain = value.abs().to_string();
    let (c_int, c_frac) = c_plain.split_once('.').unwrap_or((&c_plain, ""));
    if c_frac.len() <= scale {
        return (c_int.to_string(), c_frac.to_string());
    }

    let if_round_up = c_frac.as_bytes()[scale] >= b'5';
    let mut v_digits: Vec<u8> = c_int.bytes().chain(c_frac[..scale].bytes()).collect();
    if if_round_up {
        let mut n_idx = v_digits.len();
        loop {
            if n_idx == 0 {
                v_digits.insert(0, b'1');
                break;
            }
            n_idx -= 1;
            if v_digits[n_idx] == b'9' {
                v_digits[n_idx] = b'0';
            } else {
                v_digits[n_idx] += 1;
                break;
            }
        }
    }

    let n_int_len = v_digits.len() - scale;
    let c_digits: String = v_digits.iter().map(|&b| char::from(b)).collect();
    (
        c_digits[..n_int_len].to_string(),
        c_digits[n_int_len..].to_string(),
    )
}

fn derive_grouped_digits(digits: &str) -> String {
    let n_len = digits.len();
    let mut c_out = String::with_capacity(n_len + n_len / 3);
    for (n_idx, c) in digits.chars().enumerate() {
        if n_idx > 0 && (n_len - n_idx) % 3 == 0 {
            c_out.push(',');
        }
        c_out.push(c);
    }
    c_out
}

/// Concatenate items, treating `None` as empty; `None` when there are no items.
pub fn concat<I, T>(items: I) -> Option<String>
where
    I: IntoIterator<Item = Option<T>>,
    T: fmt::Display,
{
    let mut it_items = items.into_iter().peekable();
    it_items.peek()?;
    let mut c_out = String::new();
    for item in it_items.flatten() {
        c_out.push_str(&item.to_string());
    }
    Some(c_out)
}

/// Parse an integer.
pub fn to_int(text: Option<&str>) -> Result<Option<i64>, XlsxMergeError> {
    let Some(text) = text else {
        return Ok(None);
    };
    text.parse::<i64>()
        .map(Some)
        .map_err(|_| XlsxMergeError::InvalidInteger {
            text: text.to_string(),
        })
}
