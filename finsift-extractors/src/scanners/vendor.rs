use std::sync::OnceLock;

use regex::Regex;

use finsift_types::{CandidateSource, FieldCandidate};

use super::{rank, RawCandidate};

/// Base scores by heuristic, in priority order. The name-quality score is
/// added on top, so a strong name from a weak heuristic can still win.
const BASE_BODY_LABELED: i32 = 20;
const BASE_SUBJECT_PREFIX: i32 = 18;
const BASE_SUBJECT_FROM: i32 = 16;
const BASE_SENDER_NAME: i32 = 14;
const BASE_SENDER_NAME_SPLIT: i32 = 10;
const BASE_SENDER_DOMAIN: i32 = 4;

const NOISE_WORDS: &[&str] = &[
    "billing",
    "payment",
    "payments",
    "invoice",
    "invoices",
    "support",
    "noreply",
    "no-reply",
    "notification",
    "notifications",
    "accounts",
    "account",
    "admin",
    "info",
    "mailer",
    "team",
    "sales",
    "service",
];

const LEGAL_SUFFIXES: &[&str] = &[
    "inc", "llc", "ltd", "gmbh", "corp", "co", "company", "plc", "ag", "sa", "bv", "pty", "sarl",
    "srl", "oy", "ab", "kk", "limited", "incorporated",
];

fn finance_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:invoice|receipt|payment|statement|bill|billing|order|reminder|due)\b")
            .unwrap()
    })
}

fn subject_from_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bfrom\s+([A-Z][\w&.,' -]{1,59})").unwrap())
}

fn body_labeled_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^\s*(?:vendor|merchant|payee|supplier|sold\s+by|billed\s+by)\s*:\s*(.{2,60})$")
            .unwrap()
    })
}

/// Strip quoting, trailing punctuation, and embedded address syntax from a
/// display-name-like string.
fn clean_name(raw: &str) -> String {
    let mut name = raw.trim();
    if let Some(idx) = name.find('<') {
        name = name[..idx].trim_end();
    }
    let mut name = name.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace());
    if let Some(idx) = name.find('@') {
        name = name[..idx].trim_end();
    }
    name.trim_end_matches(|c: char| c == '.' || c == ',' || c == '-' || c.is_whitespace())
        .to_string()
}

/// Compact alphanumeric token dominated by digits, e.g. an order id mistaken
/// for a name.
fn looks_like_id(name: &str) -> bool {
    let compact: String = name.chars().filter(|c| c.is_alphanumeric()).collect();
    if compact.len() < 4 {
        return false;
    }
    let digits = compact.chars().filter(|c| c.is_ascii_digit()).count();
    digits * 2 >= compact.len()
}

/// Heuristic quality of a vendor-name string, 0 to roughly 40. A score of 0
/// means the candidate is treated as absent.
pub fn score_vendor_name(name: &str) -> i32 {
    let name = name.trim();
    if name.is_empty() || !name.chars().any(|c| c.is_alphabetic()) {
        return 0;
    }
    if looks_like_id(name) {
        return 0;
    }

    let lower = name.to_lowercase();
    let mut score = 5;

    if name.len() >= 4 {
        score += 8;
    }
    if name.len() >= 10 {
        score += 6;
    }

    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words
        .last()
        .map(|w| LEGAL_SUFFIXES.contains(w))
        .unwrap_or(false)
    {
        score += 10;
    }
    for word in &words {
        if NOISE_WORDS.contains(word) {
            score -= 10;
        }
    }

    if name.chars().any(|c| c.is_ascii_digit()) {
        score -= 8;
    }

    score.clamp(0, 40)
}

fn push_candidate(raw: &mut Vec<RawCandidate<String>>, name: &str, base: i32, context: &str, position: usize) {
    let cleaned = clean_name(name);
    let quality = score_vendor_name(&cleaned);
    if quality == 0 {
        return;
    }
    raw.push(RawCandidate {
        value: cleaned,
        score: base + quality,
        context: context.to_string(),
        position,
    });
}

/// Scan the email's structured parts for vendor candidates, in priority
/// order: subject colon-prefix, cleaned sender display name, subject
/// "from X", labeled body lines, a sender-name "X from Y" / "X - Y" split,
/// and finally the sender's email domain capitalized.
pub fn scan_vendor_email(
    subject: &str,
    body: &str,
    sender_name: &str,
    sender_email: &str,
) -> Vec<FieldCandidate<String>> {
    let mut raw = Vec::new();

    // Subject colon-prefix, unless the prefix is finance phrasing like
    // "Invoice: ..." rather than a sender name.
    if let Some((prefix, _)) = subject.split_once(':') {
        if !finance_keyword_re().is_match(prefix) {
            push_candidate(&mut raw, prefix, BASE_SUBJECT_PREFIX, subject, 0);
        }
    }

    let sender_cleaned = clean_name(sender_name);
    if !sender_cleaned.is_empty() {
        push_candidate(&mut raw, &sender_cleaned, BASE_SENDER_NAME, sender_name, 1);
    }

    if let Some(caps) = subject_from_re().captures(subject) {
        if let Some(m) = caps.get(1) {
            push_candidate(&mut raw, m.as_str(), BASE_SUBJECT_FROM, subject, 2 + m.start());
        }
    }

    for caps in body_labeled_re().captures_iter(body) {
        if let Some(m) = caps.get(1) {
            push_candidate(&mut raw, m.as_str(), BASE_BODY_LABELED, caps.get(0).unwrap().as_str(), 3 + m.start());
        }
    }

    // "Ana from Stripe" or "Ana - Stripe": the trailing part names the
    // company.
    for separator in [" from ", " - ", " at "] {
        if let Some((_, company)) = sender_name.split_once(separator) {
            push_candidate(&mut raw, company, BASE_SENDER_NAME_SPLIT, sender_name, 4);
            break;
        }
    }

    let domain = sender_email
        .rsplit('@')
        .next()
        .unwrap_or("")
        .trim_end_matches('>');
    if let Some(label) = domain.split('.').next() {
        if !label.is_empty() {
            let mut chars = label.chars();
            let capitalized: String = chars
                .next()
                .map(|c| c.to_uppercase().collect::<String>() + chars.as_str())
                .unwrap_or_default();
            push_candidate(&mut raw, &capitalized, BASE_SENDER_DOMAIN, sender_email, 5);
        }
    }

    rank(raw, CandidateSource::Email)
}

/// Scan a free-text blob (attachment text) for labeled vendor lines.
pub fn scan_vendor_text(text: &str, source: CandidateSource) -> Vec<FieldCandidate<String>> {
    let mut raw = Vec::new();
    for caps in body_labeled_re().captures_iter(text) {
        if let Some(m) = caps.get(1) {
            push_candidate(
                &mut raw,
                m.as_str(),
                BASE_BODY_LABELED,
                caps.get(0).unwrap().as_str(),
                m.start(),
            );
        }
    }
    rank(raw, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_rejects_noise_and_ids() {
        assert_eq!(score_vendor_name("billing"), 0);
        assert_eq!(score_vendor_name("noreply"), 0);
        assert_eq!(score_vendor_name("INV20240892"), 0);
        assert_eq!(score_vendor_name(""), 0);
        assert_eq!(score_vendor_name("12345"), 0);
    }

    #[test]
    fn test_score_rewards_entities() {
        let acme = score_vendor_name("Acme Corp");
        assert!(acme > score_vendor_name("Acme"));
        assert!(score_vendor_name("Initech GmbH") >= 20);
        assert!(score_vendor_name("AWS") > 0);
    }

    #[test]
    fn test_subject_from_pattern() {
        let candidates = scan_vendor_email(
            "Invoice #INV-2024-0892 from AWS",
            "",
            "",
            "billing@amazon.com",
        );
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].value, "AWS");
    }

    #[test]
    fn test_subject_colon_prefix_skips_finance_phrasing() {
        let candidates = scan_vendor_email("Invoice: your order", "", "", "x@shop.example.com");
        assert!(candidates.iter().all(|c| c.value != "Invoice"));

        let candidates = scan_vendor_email("Stripe Billing: receipt", "", "", "x@stripe.com");
        // "Billing" in the prefix is a finance keyword; the prefix is skipped
        assert!(candidates.iter().all(|c| !c.value.contains("Billing")));
    }

    #[test]
    fn test_sender_display_name_cleaned() {
        let candidates = scan_vendor_email(
            "Your receipt",
            "",
            "\"Digital Ocean Inc.\" <noreply@digitalocean.com>",
            "noreply@digitalocean.com",
        );
        assert_eq!(candidates[0].value, "Digital Ocean Inc");
    }

    #[test]
    fn test_sender_name_split() {
        let candidates = scan_vendor_email("hello", "", "Ana from Stripe", "ana@stripe.com");
        assert!(candidates.iter().any(|c| c.value == "Stripe"));
    }

    #[test]
    fn test_body_labeled_line() {
        let candidates = scan_vendor_email(
            "Receipt",
            "Order summary\nVendor: Initech GmbH\nTotal: $5",
            "",
            "noreply@mailer.example.com",
        );
        assert_eq!(candidates[0].value, "Initech GmbH");
        assert!(candidates[0].context.contains("Vendor"));
    }

    #[test]
    fn test_domain_fallback() {
        let candidates = scan_vendor_email("hello", "", "", "team@fastmail.com");
        assert!(candidates.iter().any(|c| c.value == "Fastmail"));
    }

    #[test]
    fn test_attachment_text_scan() {
        let candidates = scan_vendor_text(
            "Invoice 42\nSupplier: Globex Corporation\nTotal: 10",
            CandidateSource::Attachment,
        );
        assert_eq!(candidates[0].value, "Globex Corporation");
        assert_eq!(candidates[0].source, CandidateSource::Attachment);
    }
}
