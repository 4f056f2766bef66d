// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" spreadsheet/number/date handling so
// the rest of the code can assume clean, typed values.
use chrono::{Days, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;

/// Serial day of 1950-01-01. Smaller numbers are more likely a bare year
/// than a project date.
const MIN_SERIAL_DAY: i64 = 18_264;
/// Largest serial day a spreadsheet can hold (9999-12-31).
const MAX_SERIAL_DAY: i64 = 2_958_465;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators and currency signs before parsing.
/// - Returns `None` for anything that cannot be safely parsed or is not finite.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s: String = s.chars().filter(|c| !matches!(c, ',' | '$')).collect();
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a progress value into a fraction.
///
/// `"45%"` becomes `0.45`; a bare number is taken as already being a fraction.
pub fn parse_fraction_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    match s.strip_suffix('%') {
        Some(pct) => parse_f64_safe(Some(pct)).map(|v| v / 100.0),
        None => parse_f64_safe(Some(s)),
    }
}

/// Parse a percentage value; a trailing `%` is accepted and ignored.
pub fn parse_percent_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    parse_f64_safe(Some(s.strip_suffix('%').unwrap_or(s)))
}

pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    let v = parse_f64_safe(s)?;
    if v < 0.0 || v > u32::MAX as f64 {
        return None;
    }
    Some(v.trunc() as u32)
}

/// Parse a date written as `YYYY-MM-DD`, `MM/DD/YYYY`, a `YYYY-MM-DD HH:MM:SS`
/// timestamp or a spreadsheet serial day number (days since 1899-12-30).
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Some(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt.date());
    }
    let serial = s.parse::<f64>().ok()?;
    if !serial.is_finite() {
        return None;
    }
    from_serial_day(serial.trunc() as i64)
}

pub fn from_serial_day(serial: i64) -> Option<NaiveDate> {
    if !(MIN_SERIAL_DAY..=MAX_SERIAL_DAY).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial as u64))
}

pub fn days_diff(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64
}

/// Sum that does not depend on the order of `values`.
///
/// Floating point addition is not associative, so the values are put in a
/// total order before folding.
pub fn stable_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut v: Vec<f64> = values.into_iter().collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v.into_iter().sum()
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    stable_sum(v.iter().copied()) / v.len() as f64
}

/// Descending comparison for optional floats, `None` sorted last.
pub fn cmp_desc_none_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places with locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => group_thousands(int_part),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Comma-group a plain digit string; used past the range of `u128`.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `format_number` for optional values; missing values render as `N/A`.
pub fn format_optional(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format_number(v, decimals))
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amounts_with_separators() {
        assert_eq!(parse_f64_safe(Some(" 1,250,000.50 ")), Some(1_250_000.5));
        assert_eq!(parse_f64_safe(Some("$300")), Some(300.0));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn fractions_accept_percent_suffix() {
        assert_eq!(parse_fraction_safe(Some("45%")), Some(0.45));
        assert_eq!(parse_fraction_safe(Some("0.8")), Some(0.8));
        assert_eq!(parse_percent_safe(Some("120%")), Some(120.0));
        assert_eq!(parse_percent_safe(Some("75.5")), Some(75.5));
    }

    #[test]
    fn risk_counts_truncate_and_reject_negatives() {
        assert_eq!(parse_u32_safe(Some("3")), Some(3));
        assert_eq!(parse_u32_safe(Some("4.0")), Some(4));
        assert_eq!(parse_u32_safe(Some("-1")), None);
    }

    #[test]
    fn dates_in_all_supported_encodings() {
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_date_safe(Some("2024-01-01")), Some(jan1));
        assert_eq!(parse_date_safe(Some("01/01/2024")), Some(jan1));
        assert_eq!(parse_date_safe(Some("45292")), Some(jan1));
        assert_eq!(parse_date_safe(Some("45292.75")), Some(jan1));
        assert_eq!(parse_date_safe(Some("2024-01-01 00:00:00")), Some(jan1));
        assert_eq!(parse_date_safe(Some("2024-01-01T13:45:00")), Some(jan1));
        assert_eq!(parse_date_safe(Some("0")), None);
        assert_eq!(parse_date_safe(Some("soon")), None);
    }

    #[test]
    fn bare_years_are_not_serial_days() {
        assert_eq!(parse_date_safe(Some("2024")), None);
        assert_eq!(parse_date_safe(Some("18263")), None);
        assert_eq!(
            parse_date_safe(Some("18264")),
            NaiveDate::from_ymd_opt(1950, 1, 1)
        );
    }

    #[test]
    fn stable_sum_ignores_order() {
        let a = [1e16, 1.0, -1e16, 3.5, 0.1];
        let mut b = a;
        b.reverse();
        assert_eq!(stable_sum(a), stable_sum(b));
        assert_eq!(stable_sum(Vec::<f64>::new()), 0.0);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-45.0, 1), "-45.0");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(12.0, 0), "12");
        assert_eq!(format_optional(None, 2), "N/A");
        assert_eq!(format_int(9855usize), "9,855");
    }

    #[test]
    fn huge_amounts_keep_their_digits() {
        assert_eq!(format_number(1e19, 2), "10,000,000,000,000,000,000.00");
        let beyond_u128 = format_number(1e40, 0);
        assert!(beyond_u128.starts_with("10,000,000,000,000,000,"));
        assert_eq!(beyond_u128.len(), 41 + 13);
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("123"), "123");
    }

    #[test]
    fn optional_descending_puts_none_last() {
        let mut v = vec![None, Some(1.0), Some(2.5), None, Some(0.3)];
        v.sort_by(|a, b| cmp_desc_none_last(*a, *b));
        assert_eq!(v, vec![Some(2.5), Some(1.0), Some(0.3), None, None]);
    }
}
