//! Cross-source arbitration: one winning candidate per field from the
//! email-derived and attachment-derived blobs.

use tracing::debug;

use finsift_types::{AmountValue, FieldChoice};

/// Arbitration tunables. The floor and margins are implementation defaults,
/// not invariants; callers may override them from configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Email candidates scoring below this are treated as low-confidence
    /// and lose to any attachment candidate.
    pub low_confidence_floor: i32,
    pub vendor_margin: i32,
    pub amount_margin: i32,
    pub invoice_margin: i32,
    pub date_margin: i32,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            low_confidence_floor: 18,
            vendor_margin: 5,
            amount_margin: 8,
            invoice_margin: 5,
            date_margin: 5,
        }
    }
}

/// Pick between the best email-sourced and best attachment-sourced
/// candidate for one field.
///
/// The attachment candidate wins when there is no email candidate, when the
/// email candidate sits below the low-confidence floor, or when the
/// attachment score beats the email score by more than `margin`. Otherwise
/// the email candidate is kept.
pub fn arbitrate<T>(
    email: FieldChoice<T>,
    attachment: FieldChoice<T>,
    floor: i32,
    margin: i32,
) -> FieldChoice<T> {
    match (email, attachment) {
        (None, None) => None,
        (Some(e), None) => Some(e),
        (None, Some(a)) => Some(a),
        (Some(e), Some(a)) => {
            if e.score < floor || a.score > e.score + margin {
                Some(a)
            } else {
                Some(e)
            }
        }
    }
}

fn digit_sequence(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// The amount scanner frequently misfires on numeric-looking invoice
/// numbers. When the chosen amount's digit sequence equals the chosen
/// invoice number's digit sequence, the amount choice is dropped.
pub fn suppress_amount_invoice_conflict(
    amount: FieldChoice<AmountValue>,
    invoice_number: &FieldChoice<String>,
) -> FieldChoice<AmountValue> {
    let amount = amount?;
    if let Some(invoice) = invoice_number {
        if amount.value.digit_sequence() == digit_sequence(&invoice.value) {
            debug!(
                amount = amount.value.amount,
                invoice = %invoice.value,
                "amount digits equal invoice digits, dropping amount"
            );
            return None;
        }
    }
    Some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsift_types::{CandidateSource, FieldCandidate};

    fn cand(score: i32, source: CandidateSource) -> FieldCandidate<&'static str> {
        FieldCandidate::new("x", score, "ctx", source)
    }

    #[test]
    fn test_email_kept_when_strong() {
        let cfg = ArbiterConfig::default();
        let chosen = arbitrate(
            Some(cand(30, CandidateSource::Email)),
            Some(cand(33, CandidateSource::Attachment)),
            cfg.low_confidence_floor,
            cfg.vendor_margin,
        )
        .unwrap();
        assert_eq!(chosen.source, CandidateSource::Email);
    }

    #[test]
    fn test_attachment_wins_past_margin() {
        let cfg = ArbiterConfig::default();
        let chosen = arbitrate(
            Some(cand(30, CandidateSource::Email)),
            Some(cand(36, CandidateSource::Attachment)),
            cfg.low_confidence_floor,
            cfg.vendor_margin,
        )
        .unwrap();
        assert_eq!(chosen.source, CandidateSource::Attachment);
    }

    #[test]
    fn test_attachment_wins_over_low_confidence_email() {
        let cfg = ArbiterConfig::default();
        let chosen = arbitrate(
            Some(cand(10, CandidateSource::Email)),
            Some(cand(11, CandidateSource::Attachment)),
            cfg.low_confidence_floor,
            cfg.vendor_margin,
        )
        .unwrap();
        assert_eq!(chosen.source, CandidateSource::Attachment);
    }

    #[test]
    fn test_single_source_and_empty() {
        let chosen = arbitrate(None, Some(cand(1, CandidateSource::Attachment)), 18, 5);
        assert_eq!(chosen.unwrap().source, CandidateSource::Attachment);
        assert!(arbitrate::<&str>(None, None, 18, 5).is_none());
    }

    #[test]
    fn test_conflict_suppression() {
        let amount = Some(FieldCandidate::new(
            AmountValue::new(20240892.0, None),
            12,
            "ctx",
            CandidateSource::Email,
        ));
        let invoice = Some(FieldCandidate::new(
            "INV-2024-0892".to_string(),
            30,
            "ctx",
            CandidateSource::Email,
        ));
        assert!(suppress_amount_invoice_conflict(amount, &invoice).is_none());

        let amount = Some(FieldCandidate::new(
            AmountValue::new(12847.32, Some("$".into())),
            40,
            "ctx",
            CandidateSource::Email,
        ));
        assert!(suppress_amount_invoice_conflict(amount, &invoice).is_some());
    }
}
