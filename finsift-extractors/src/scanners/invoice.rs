use std::sync::OnceLock;

use regex::Regex;

use finsift_types::{CandidateSource, FieldCandidate};

use super::{context_window, rank, RawCandidate};

const BASE_SCORE: i32 = 10;
/// File-name matches are weaker evidence than body matches.
const FILENAME_PENALTY: i32 = -6;

const CONTEXT_RADIUS: usize = 40;

/// "invoice number/no/#/id: <token>" phrasing.
fn strong_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:invoice|inv|reference|ref|order|statement|bill)\s*(?:number|num|no\.?|id|#)\s*[:#]?\s*([A-Za-z0-9][A-Za-z0-9/_.-]{1,39})",
        )
        .unwrap()
    })
}

/// Bare "invoice <token>" phrasing, including hyphenated file-name style.
fn bare_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:invoice|inv|statement|bill)\s*[:#_-]?\s*([A-Za-z0-9][A-Za-z0-9/_-]{1,39})")
            .unwrap()
    })
}

/// Reject tokens that are really dates: separator-delimited date shapes and
/// pure-numeric YYYYMMDD.
fn looks_like_date_token(token: &str) -> bool {
    static SHAPES: OnceLock<Vec<Regex>> = OnceLock::new();
    let shapes = SHAPES.get_or_init(|| {
        [
            r"^\d{4}[-/.]\d{1,2}[-/.]\d{1,2}$",
            r"^\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}$",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });
    if shapes.iter().any(|re| re.is_match(token)) {
        return true;
    }

    // YYYYMMDD with a plausible month and day
    if token.len() == 8 && token.chars().all(|c| c.is_ascii_digit()) {
        let month: u32 = token[4..6].parse().unwrap_or(0);
        let day: u32 = token[6..8].parse().unwrap_or(0);
        if (1..=12).contains(&month) && (1..=31).contains(&day) {
            return true;
        }
    }
    false
}

/// Token rules: must contain a digit and be 3 to 30 characters after
/// stripping separators.
fn valid_token(token: &str) -> bool {
    let compact: String = token.chars().filter(|c| c.is_alphanumeric()).collect();
    (3..=30).contains(&compact.len())
        && compact.chars().any(|c| c.is_ascii_digit())
        && !looks_like_date_token(token)
}

fn score_token(token: &str, strong_label: bool, bare_label: bool) -> i32 {
    let mut score = BASE_SCORE;
    if strong_label {
        score += 20;
    } else if bare_label {
        score += 8;
    }
    if token.len() >= 8 {
        score += 4;
    }
    let has_alpha = token.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = token.chars().any(|c| c.is_ascii_digit());
    if has_alpha && has_digit {
        score += 3;
    }
    score
}

/// Label stripped, separators preserved, uppercased.
fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| c == '.' || c == '-' || c == '_' || c == ':' || c == '#')
        .to_uppercase()
}

fn scan_with(
    re: &Regex,
    text: &str,
    strong: bool,
    penalty: i32,
    seen: &mut Vec<String>,
    raw: &mut Vec<RawCandidate<String>>,
) {
    for caps in re.captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        let token = m.as_str();
        if !valid_token(token) {
            continue;
        }
        let value = normalize_token(token);
        if value.is_empty() || seen.contains(&value) {
            continue;
        }
        seen.push(value.clone());

        let whole = caps.get(0).unwrap();
        raw.push(RawCandidate {
            value,
            score: score_token(token, strong, !strong) + penalty,
            context: context_window(text, whole.start(), whole.end(), CONTEXT_RADIUS),
            position: m.start(),
        });
    }
}

/// Scan a text blob for invoice/reference-number candidates.
pub fn scan_invoice_numbers(text: &str, source: CandidateSource) -> Vec<FieldCandidate<String>> {
    let mut raw = Vec::new();
    let mut seen = Vec::new();
    scan_with(strong_label_re(), text, true, 0, &mut seen, &mut raw);
    scan_with(bare_label_re(), text, false, 0, &mut seen, &mut raw);
    rank(raw, source)
}

/// Scan attachment file names for invoice-number candidates. Always
/// attachment-sourced, penalized against body matches.
pub fn scan_invoice_filenames(names: &[String]) -> Vec<FieldCandidate<String>> {
    let mut raw = Vec::new();
    let mut seen = Vec::new();
    for name in names {
        let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
        scan_with(strong_label_re(), stem, true, FILENAME_PENALTY, &mut seen, &mut raw);
        scan_with(bare_label_re(), stem, false, FILENAME_PENALTY, &mut seen, &mut raw);
    }
    rank(raw, CandidateSource::Attachment)
}
