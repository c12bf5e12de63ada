use std::sync::OnceLock;

use regex::Regex;

fn terms_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)\bpayment\s+terms?\s*:?\s*net\s*[- ]?(\d{1,3})\b",
            r"(?i)\bnet\s*[- ]?(\d{1,3})\b",
            r"(?i)\bdue\s+in\s+(\d{1,3})\s+days\b",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Single-valued field: the first matching pattern wins, normalized to
/// `"Net N"`.
pub fn scan_payment_terms(text: &str) -> Option<String> {
    for pattern in terms_patterns() {
        if let Some(caps) = pattern.captures(text) {
            if let Some(days) = caps.get(1) {
                return Some(format!("Net {}", days.as_str()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_n_variants() {
        assert_eq!(scan_payment_terms("Payment terms: Net 30").as_deref(), Some("Net 30"));
        assert_eq!(scan_payment_terms("net-15 as agreed").as_deref(), Some("Net 15"));
        assert_eq!(scan_payment_terms("due in 45 days").as_deref(), Some("Net 45"));
    }

    #[test]
    fn test_labeled_terms_win_over_bare_net() {
        let text = "we moved off net 60; payment terms: net 30 from today";
        assert_eq!(scan_payment_terms(text).as_deref(), Some("Net 30"));
    }

    #[test]
    fn test_no_terms() {
        assert_eq!(scan_payment_terms("no schedule mentioned"), None);
        assert_eq!(scan_payment_terms("the internet 30 years ago"), None);
    }
}
