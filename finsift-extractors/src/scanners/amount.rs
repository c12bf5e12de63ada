use std::sync::OnceLock;

use regex::Regex;

use finsift_types::{AmountValue, CandidateSource, FieldCandidate};

use super::{context_window, rank, RawCandidate};

/// Candidates above this are rejected outright as parser misfires.
const MAX_AMOUNT: f64 = 10_000_000.0;

/// Candidates below this score with no currency marker are discarded
/// before ranking.
const MIN_UNMARKED_SCORE: i32 = 8;

const CONTEXT_RADIUS: usize = 50;

struct AmountPattern {
    regex: Regex,
    value_group: usize,
    currency_group: Option<usize>,
}

fn amount_patterns() -> &'static [AmountPattern] {
    static PATTERNS: OnceLock<Vec<AmountPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            // currency code then number: "USD 1,234.56"
            AmountPattern {
                regex: Regex::new(
                    r"(?i)\b(USD|EUR|GBP|CAD|AUD|CHF|JPY|INR|NZD|SEK)\s*([0-9][0-9.,]*)",
                )
                .unwrap(),
                value_group: 2,
                currency_group: Some(1),
            },
            // number then currency code: "1.234,56 EUR"
            AmountPattern {
                regex: Regex::new(
                    r"(?i)\b([0-9][0-9.,]*)\s*(USD|EUR|GBP|CAD|AUD|CHF|JPY|INR|NZD|SEK)\b",
                )
                .unwrap(),
                value_group: 1,
                currency_group: Some(2),
            },
            // symbol then number: "$1,234.56"
            AmountPattern {
                regex: Regex::new(r"([$€£¥])\s*([0-9][0-9.,]*)").unwrap(),
                value_group: 2,
                currency_group: Some(1),
            },
            // amount keyword then number, optional symbol in between
            AmountPattern {
                regex: Regex::new(
                    r"(?i)\b(?:total|amount\s+due|balance\s+due|paid|charged)\b[^0-9$€£¥\n]{0,24}([$€£¥])?\s*([0-9][0-9.,]*)",
                )
                .unwrap(),
                value_group: 2,
                currency_group: Some(1),
            },
            // bare thousands-grouped decimal, US or European grouping
            AmountPattern {
                regex: Regex::new(
                    r"\b[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]{1,2})?\b|\b[0-9]{1,3}(?:\.[0-9]{3})+(?:,[0-9]{1,2})?\b",
                )
                .unwrap(),
                value_group: 0,
                currency_group: None,
            },
        ]
    })
}

/// Parse a numeric token, disambiguating comma/period as thousands vs
/// decimal separator.
///
/// Both present: the later-occurring separator is the decimal point.
/// Comma only, with exactly two trailing digits: comma is the decimal
/// point. Otherwise commas group thousands and periods follow the usual
/// reading (several periods group thousands, one is a decimal point).
pub fn parse_amount_token(token: &str) -> Option<f64> {
    let tok = token.trim().trim_matches(|c| c == '.' || c == ',');
    if tok.is_empty() || !tok.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let last_comma = tok.rfind(',');
    let last_dot = tok.rfind('.');

    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            if dot > comma {
                tok.replace(',', "")
            } else {
                tok.replace('.', "").replace(',', ".")
            }
        }
        (Some(comma), None) => {
            let trailing = tok.len() - comma - 1;
            if tok.matches(',').count() == 1 && trailing == 2 {
                tok.replace(',', ".")
            } else {
                tok.replace(',', "")
            }
        }
        (None, Some(_)) => {
            if tok.matches('.').count() > 1 {
                tok.replace('.', "")
            } else {
                tok.to_string()
            }
        }
        (None, None) => tok.to_string(),
    };

    normalized.parse().ok()
}

fn amount_due_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:total|amount|balance)\s+due\b|\bgrand\s+total\b").unwrap()
    })
}

fn bare_total_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\btotal\b").unwrap())
}

fn amount_verb_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:amount|paid|payment|charged|billed)\b").unwrap())
}

fn negative_context_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:subtotal|sub-total|tax|vat|gst|shipping|discount|fees?)\b").unwrap()
    })
}

fn reference_context_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:order|account|reference|ref)\b").unwrap())
}

fn amount_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:total|amount|balance|due|paid|charged)\b").unwrap())
}

fn yearish_context_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\b|\bdate\b|\bdated\b",
        )
        .unwrap()
    })
}

fn score_amount_context(context: &str, value: f64, has_currency: bool) -> i32 {
    let ctx = context.to_lowercase();
    let mut score = 0;

    if amount_due_re().is_match(&ctx) {
        score += 45;
    } else if bare_total_re().is_match(&ctx) {
        score += 20;
    }
    if amount_verb_re().is_match(&ctx) {
        score += 12;
    }
    if negative_context_re().is_match(&ctx) {
        score -= 20;
    }

    let has_amount_keyword = amount_keyword_re().is_match(&ctx);
    if reference_context_re().is_match(&ctx) && !has_amount_keyword {
        score -= 12;
    }

    if has_currency {
        score += 5;
    }

    // Year-vs-amount disambiguation: a bare 1900-2105 integer next to a
    // month name or "date" is almost always a year.
    if value.fract() == 0.0
        && (1900.0..=2105.0).contains(&value)
        && yearish_context_re().is_match(&ctx)
        && !has_amount_keyword
    {
        score -= 50;
    }

    if value >= 100.0 {
        score += 2;
    }
    if value < 2.0 {
        score -= 4;
    }

    score
}

/// Scan a text blob for monetary amount candidates.
pub fn scan_amounts(text: &str, source: CandidateSource) -> Vec<FieldCandidate<AmountValue>> {
    let mut raw = Vec::new();

    for pattern in amount_patterns() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(value_match) = caps.get(pattern.value_group) else {
                continue;
            };
            let Some(value) = parse_amount_token(value_match.as_str()) else {
                continue;
            };
            if !(0.0..=MAX_AMOUNT).contains(&value) {
                continue;
            }

            let currency = pattern
                .currency_group
                .and_then(|g| caps.get(g))
                .map(|c| c.as_str().to_uppercase());

            let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
            let context = context_window(text, whole.0, whole.1, CONTEXT_RADIUS);
            let score = score_amount_context(&context, value, currency.is_some());

            if score < MIN_UNMARKED_SCORE && currency.is_none() {
                continue;
            }

            raw.push(RawCandidate {
                value: AmountValue::new(value, currency),
                score,
                context,
                position: value_match.start(),
            });
        }
    }

    rank(raw, source)
}
