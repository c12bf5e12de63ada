use regex::Regex;
use tracing::debug;

use finsift_types::{ClassificationResult, EmailType};

/// Keyword/pattern classifier deciding whether a document is
/// finance-relevant, non-finance, or ignorable by sender domain.
///
/// A `non-finance` or `ignored` result is a hard stop signal: downstream
/// stages must not run.
pub struct EmailClassifier {
    finance_patterns: Vec<Regex>,
    non_finance_patterns: Vec<Regex>,
    sub_types: Vec<(Regex, EmailType, f32)>,
    denylisted_domains: Vec<String>,
}

fn finance_pattern_set() -> Vec<Regex> {
    [
        r"\binvoice\b",
        r"\breceipt\b",
        r"\bpayment\b",
        r"\bbilling\b",
        r"\bstatement\b",
        r"\bamount\s+due\b",
        r"\bbalance\s+due\b",
        r"\bpast\s+due\b",
        r"[$€£¥]\s*\d",
        r"\b(?:usd|eur|gbp|cad|aud|inr)\s*\d",
        r"\bpurchase\s+order\b",
        r"\bp\.?o\.?\s*#\s*\w",
        r"\bremittance\b",
        r"\bwire\s+transfer\b",
        r"\bach\s+(?:transfer|payment|debit|credit)\b",
        r"\b(?:credit|debit)\s+memo\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
}

fn non_finance_pattern_set() -> Vec<Regex> {
    [
        r"\bunsubscribe\b",
        r"\bnewsletter\b",
        r"\bwebinar\b",
        r"\bpassword\s+reset\b",
        r"\breset\s+your\s+password\b",
        r"\bverify\s+your\s+(?:email|account)\b",
        r"\bfree\s+trial\b",
        r"\blimited\s+time\s+offer\b",
        r"\bjob\s+alert\b",
        r"\bfollow\s+us\s+on\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
}

/// Finance sub-types in priority order, with their fixed confidences.
fn sub_type_set() -> Vec<(Regex, EmailType, f32)> {
    [
        (r"\binvoice\b", EmailType::Invoice, 0.9),
        (r"\breceipt\b", EmailType::Receipt, 0.85),
        (r"\bpayment\b", EmailType::Payment, 0.85),
        (r"\bstatement\b", EmailType::Statement, 0.8),
    ]
    .iter()
    .map(|(p, t, c)| (Regex::new(p).unwrap(), *t, *c))
    .collect()
}

impl EmailClassifier {
    pub fn new(denylisted_domains: Vec<String>) -> Self {
        Self {
            finance_patterns: finance_pattern_set(),
            non_finance_patterns: non_finance_pattern_set(),
            sub_types: sub_type_set(),
            denylisted_domains: denylisted_domains
                .into_iter()
                .map(|d| d.to_lowercase())
                .collect(),
        }
    }

    pub fn classify(&self, subject: &str, body: &str, sender_email: &str) -> ClassificationResult {
        let sender_domain = sender_email
            .rsplit('@')
            .next()
            .unwrap_or("")
            .trim_end_matches('>')
            .to_lowercase();

        if self.denylisted_domains.iter().any(|d| d == &sender_domain) {
            return ClassificationResult::new(
                EmailType::Ignored,
                1.0,
                format!("sender domain {} is denylisted", sender_domain),
            );
        }

        let text = format!("{}\n{}", subject, body).to_lowercase();

        let finance_score = self
            .finance_patterns
            .iter()
            .filter(|p| p.is_match(&text))
            .count();
        let non_finance_score = self
            .non_finance_patterns
            .iter()
            .filter(|p| p.is_match(&text))
            .count();

        debug!(finance_score, non_finance_score, "classified document text");

        if finance_score >= 2 || (finance_score >= 1 && non_finance_score == 0) {
            for (pattern, email_type, confidence) in &self.sub_types {
                if pattern.is_match(&text) {
                    return ClassificationResult::new(
                        *email_type,
                        *confidence,
                        format!("{} finance signals", finance_score),
                    );
                }
            }
            return ClassificationResult::new(
                EmailType::Financial,
                0.7,
                format!("{} finance signals, no specific sub-type", finance_score),
            );
        }

        // A document with no signals of either kind stays unknown rather
        // than being written off as non-finance.
        if non_finance_score >= 2 || (finance_score == 0 && non_finance_score >= 1) {
            return ClassificationResult::new(
                EmailType::NonFinance,
                0.7,
                format!(
                    "{} finance vs {} non-finance signals",
                    finance_score, non_finance_score
                ),
            );
        }

        ClassificationResult::new(EmailType::Unknown, 0.5, "no decisive signals")
    }
}
