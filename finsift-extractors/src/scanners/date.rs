use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use finsift_types::{CandidateSource, FieldCandidate};

use super::{context_window, rank, RawCandidate};

const CONTEXT_RADIUS: usize = 30;

/// How far back a label may sit from the date it labels.
const LABEL_LOOKBEHIND: usize = 24;

const ISSUE_LABEL_BONUS: i32 = 12;
const DUE_LABEL_PENALTY: i32 = -6;

struct DateShape {
    regex: Regex,
    base_score: i32,
    parse: fn(&regex::Captures) -> Option<NaiveDate>,
}

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_lowercase();
    MONTHS.iter().position(|m| *m == prefix).map(|i| i as u32 + 1)
}

fn in_range(date: NaiveDate) -> Option<NaiveDate> {
    use chrono::Datelike;
    if (1990..=2100).contains(&date.year()) {
        Some(date)
    } else {
        None
    }
}

fn parse_day_month_year(caps: &regex::Captures) -> Option<NaiveDate> {
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month = month_number(caps.get(2)?.as_str())?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).and_then(in_range)
}

fn parse_month_day_year(caps: &regex::Captures) -> Option<NaiveDate> {
    let month = month_number(caps.get(1)?.as_str())?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).and_then(in_range)
}

fn parse_iso(caps: &regex::Captures) -> Option<NaiveDate> {
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).and_then(in_range)
}

/// Slash/dash numeric dates read as month-first when the first component can
/// be a month, day-first otherwise. Two-digit years land in 2000-2099.
fn parse_numeric(caps: &regex::Captures) -> Option<NaiveDate> {
    let a: u32 = caps.get(1)?.as_str().parse().ok()?;
    let b: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year_str = caps.get(3)?.as_str();
    let mut year: i32 = year_str.parse().ok()?;
    if year_str.len() == 2 {
        year += 2000;
    }

    let (month, day) = if a <= 12 { (a, b) } else { (b, a) };
    NaiveDate::from_ymd_opt(year, month, day).and_then(in_range)
}

fn date_shapes() -> &'static [DateShape] {
    static SHAPES: OnceLock<Vec<DateShape>> = OnceLock::new();
    SHAPES.get_or_init(|| {
        vec![
            // 15 March 2024, 3rd Jan 2025
            DateShape {
                regex: Regex::new(
                    r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(jan\w*|feb\w*|mar\w*|apr\w*|may|jun\w*|jul\w*|aug\w*|sep\w*|oct\w*|nov\w*|dec\w*)\.?,?\s+(\d{4})\b",
                )
                .unwrap(),
                base_score: 10,
                parse: parse_day_month_year,
            },
            // March 15, 2024
            DateShape {
                regex: Regex::new(
                    r"(?i)\b(jan\w*|feb\w*|mar\w*|apr\w*|may|jun\w*|jul\w*|aug\w*|sep\w*|oct\w*|nov\w*|dec\w*)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
                )
                .unwrap(),
                base_score: 10,
                parse: parse_month_day_year,
            },
            // 2024-03-15
            DateShape {
                regex: Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap(),
                base_score: 10,
                parse: parse_iso,
            },
            // 03/15/2024, 15-03-2024, 3/15/24
            DateShape {
                regex: Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})\b").unwrap(),
                base_score: 8,
                parse: parse_numeric,
            },
        ]
    })
}

fn issue_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:invoice|issue[d]?)\s+date\s*[:.]?\s*$").unwrap())
}

fn due_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:due\s+(?:date|by|on)|pay\s+by|payment\s+due)\s*[:.]?\s*$").unwrap()
    })
}

fn bare_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:date[d]?|issued)\s*[:.]?\s*$").unwrap())
}

fn period_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:billing|statement)\s+period\b").unwrap())
}

/// Lexical guard against ids and domain names: a date glued to surrounding
/// word characters is not a date.
fn embedded_in_token(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    let glued = |c: Option<char>| {
        matches!(c, Some(ch) if ch.is_alphanumeric() || ch == '-' || ch == '_' || ch == '/')
    };
    if glued(before) || glued(after) {
        return true;
    }
    // "15.03.2024.com" style: a dot joining the match to letters
    if let Some('.') = after {
        if text[end + 1..].chars().next().map(|c| c.is_alphabetic()).unwrap_or(false) {
            return true;
        }
    }
    false
}

fn label_adjustment(text: &str, start: usize) -> Option<i32> {
    let mut from = start.saturating_sub(LABEL_LOOKBEHIND);
    while from > 0 && !text.is_char_boundary(from) {
        from -= 1;
    }
    let lead = &text[from..start];
    if issue_label_re().is_match(lead) {
        Some(ISSUE_LABEL_BONUS)
    } else if due_label_re().is_match(lead) {
        Some(DUE_LABEL_PENALTY)
    } else if bare_label_re().is_match(lead) {
        Some(0)
    } else {
        None
    }
}

/// Scan a text blob for document-date candidates, normalized to ISO
/// `YYYY-MM-DD`.
pub fn scan_dates(text: &str, source: CandidateSource) -> Vec<FieldCandidate<String>> {
    let mut raw: Vec<RawCandidate<String>> = Vec::new();

    for shape in date_shapes() {
        for caps in shape.regex.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            if embedded_in_token(text, whole.start(), whole.end()) {
                continue;
            }
            let Some(date) = (shape.parse)(&caps) else {
                continue;
            };

            let context = context_window(text, whole.start(), whole.end(), CONTEXT_RADIUS);
            if period_re().is_match(&context) {
                continue;
            }

            let value = date.format("%Y-%m-%d").to_string();
            if raw.iter().any(|c| c.value == value) {
                continue;
            }

            let score = shape.base_score + label_adjustment(text, whole.start()).unwrap_or(0);
            raw.push(RawCandidate {
                value,
                score,
                context,
                position: whole.start(),
            });
        }
    }

    rank(raw, source)
}
