//! Date and amount normalization shared by every statement parser.
//!
//! Both entry points are total functions: `parse_amount` returns zero for
//! garbage and `normalize_date` passes unrecognized input through unchanged,
//! so callers decide whether a sentinel means "skip the row".

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::util::re;

// Statement vendors use at least six distinct date conventions. A linear
// ordered-match list keeps behavior deterministic and lets a new issuer's
// format slot in without touching the others.
re!(re_dmy_slash, r"\b(\d{2})/(\d{2})/(\d{4})\b");
re!(re_dmy_dash, r"\b(\d{2})-(\d{2})-(\d{4})\b");
re!(re_iso, r"\b(\d{4})-(\d{2})-(\d{2})\b");
re!(re_dmy_short, r"\b(\d{2})/(\d{2})/(\d{2})\b");
re!(
    re_dmy_month,
    r"(?i)\b(\d{1,2})[ /-](jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[ /-](\d{4})\b"
);
re!(re_dmy_loose, r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b");
re!(
    re_date_like,
    r"(?i)\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{4}[/-]\d{1,2}[/-]\d{1,2}|\d{1,2}[ /-][a-z]{3}[ /-]\d{2,4}"
);

fn month_abbr_to_num(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "jan" => Some(1), "feb" => Some(2), "mar" => Some(3), "apr" => Some(4),
        "may" => Some(5), "jun" => Some(6), "jul" => Some(7), "aug" => Some(8),
        "sep" => Some(9), "oct" => Some(10), "nov" => Some(11), "dec" => Some(12),
        _ => None,
    }
}

/// Two-digit years pivot at 50: 51-99 → 19xx, 00-50 → 20xx.
fn expand_short_year(yy: i32) -> i32 {
    if yy > 50 { 1900 + yy } else { 2000 + yy }
}

fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Try the ordered pattern list and return the first calendar-valid hit.
/// An arithmetically impossible capture (e.g. month 13) falls through to
/// the next pattern rather than failing the whole parse.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();

    if let Some(c) = re_dmy_slash().captures(s) {
        if let Some(d) = ymd(num(&c, 3)?, num(&c, 2)? as u32, num(&c, 1)? as u32) {
            return Some(d);
        }
    }
    if let Some(c) = re_dmy_dash().captures(s) {
        if let Some(d) = ymd(num(&c, 3)?, num(&c, 2)? as u32, num(&c, 1)? as u32) {
            return Some(d);
        }
    }
    if let Some(c) = re_iso().captures(s) {
        if let Some(d) = ymd(num(&c, 1)?, num(&c, 2)? as u32, num(&c, 3)? as u32) {
            return Some(d);
        }
    }
    if let Some(c) = re_dmy_short().captures(s) {
        let year = expand_short_year(num(&c, 3)?);
        if let Some(d) = ymd(year, num(&c, 2)? as u32, num(&c, 1)? as u32) {
            return Some(d);
        }
    }
    if let Some(c) = re_dmy_month().captures(s) {
        if let Some(month) = month_abbr_to_num(c.get(2)?.as_str()) {
            if let Some(d) = ymd(num(&c, 3)?, month, num(&c, 1)? as u32) {
                return Some(d);
            }
        }
    }
    if let Some(c) = re_dmy_loose().captures(s) {
        if let Some(d) = ymd(num(&c, 3)?, num(&c, 2)? as u32, num(&c, 1)? as u32) {
            return Some(d);
        }
    }

    // Last-ditch general parsing for shapes no issuer table emits but CSV
    // exports occasionally contain.
    for fmt in &["%Y/%m/%d", "%d %B %Y", "%B %d, %Y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    None
}

/// ISO `YYYY-MM-DD` on success; the input unchanged on failure. Callers
/// must treat a non-ISO-shaped result as a parse failure.
pub fn normalize_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => raw.to_string(),
    }
}

/// Cheap sniff test for "this cell could plausibly hold a date", used to
/// skip CSV noise rows before attempting a full parse.
pub fn looks_like_date(s: &str) -> bool {
    re_date_like().is_match(s)
}

fn num(c: &regex::Captures<'_>, idx: usize) -> Option<i32> {
    c.get(idx)?.as_str().parse().ok()
}

/// Signed monetary parse: strips currency symbols (₹ $ € £), thousands
/// separators, and whitespace; a parenthesized value is negative. Returns
/// zero for unparseable input; never errors.
pub fn parse_amount_signed(raw: &str) -> Decimal {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '₹' | '$' | '€' | '£' | ',') && !c.is_whitespace())
        .collect();
    let parenthesized = cleaned.contains('(') && cleaned.contains(')');
    cleaned.retain(|c| c != '(' && c != ')');

    match Decimal::from_str(&cleaned) {
        Ok(d) if parenthesized => -d.abs(),
        Ok(d) => d,
        Err(_) => Decimal::ZERO,
    }
}

/// Magnitude-only variant. Sign semantics are conveyed separately by
/// direction detection.
pub fn parse_amount(raw: &str) -> Decimal {
    parse_amount_signed(raw).abs()
}
