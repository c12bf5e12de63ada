//! Confidence-only local matcher, used when the remote reconciliation
//! service cannot be reached. Never declares a match found.

use tracing::debug;

use finsift_types::{DataQuality, ExtractedFinancialData, MatchResult};

const BASE_CONFIDENCE: f32 = 40.0;
const INVOICE_BONUS: f32 = 25.0;
const VENDOR_BONUS: f32 = 20.0;
const DATE_BONUS: f32 = 15.0;

/// Score "this document likely corresponds to a known transaction" from
/// data completeness alone.
pub fn score_local_match(extracted: &ExtractedFinancialData) -> MatchResult {
    let quality = DataQuality::of(extracted);

    if !quality.has_amount {
        return MatchResult {
            found: false,
            confidence: 0.0,
            matched_transaction: None,
            data_quality: Some(quality),
            reason: Some("no amount detected".to_string()),
        };
    }

    let mut confidence = BASE_CONFIDENCE;
    if quality.has_invoice_number {
        confidence += INVOICE_BONUS;
    }
    if quality.has_vendor {
        confidence += VENDOR_BONUS;
    }
    if quality.has_date {
        confidence += DATE_BONUS;
    }

    debug!(confidence, "scored local match fallback");
    MatchResult {
        found: false,
        confidence,
        matched_transaction: None,
        data_quality: Some(quality),
        reason: Some("remote matcher unavailable, local data-quality score".to_string()),
    }
}
