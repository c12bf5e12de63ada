use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::financial::ExtractedFinancialData;

/// Field-presence breakdown attached to a non-match as an explainability
/// aid. Booleans describe what was extracted, not ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DataQuality {
    pub has_amount: bool,
    pub has_vendor: bool,
    pub has_invoice_number: bool,
    pub has_date: bool,
}

impl DataQuality {
    pub fn of(extracted: &ExtractedFinancialData) -> Self {
        Self {
            has_amount: extracted.amount.is_some(),
            has_vendor: extracted
                .vendor_name()
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false),
            has_invoice_number: extracted.invoice_number.is_some(),
            has_date: extracted.document_date.is_some(),
        }
    }
}

/// Reference to a transaction a remote matcher reconciled against.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchedTransaction {
    pub source: String,
    pub id: String,
}

/// Outcome of matching one document against known transactions.
///
/// Only a remote collaborator may set `found = true`; the local fallback
/// reports data-quality confidence with `found = false`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchResult {
    pub found: bool,
    /// In [0, 100].
    pub confidence: f32,
    pub matched_transaction: Option<MatchedTransaction>,
    pub data_quality: Option<DataQuality>,
    pub reason: Option<String>,
}

impl MatchResult {
    pub fn not_found(confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            found: false,
            confidence,
            matched_transaction: None,
            data_quality: None,
            reason: Some(reason.into()),
        }
    }
}

/// The field subset a remote matcher needs.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchFields {
    pub vendor: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub invoice_number: Option<String>,
    pub document_date: Option<String>,
}

impl MatchFields {
    pub fn of(extracted: &ExtractedFinancialData) -> Self {
        Self {
            vendor: extracted.vendor_name().map(str::to_string),
            amount: extracted.amount_value(),
            currency: extracted
                .amount
                .as_ref()
                .and_then(|c| c.value.currency.clone()),
            invoice_number: extracted.invoice_number_value().map(str::to_string),
            document_date: extracted.document_date_value().map(str::to_string),
        }
    }
}

/// What happened to an unmatched document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "data")]
#[ts(export)]
pub enum ExceptionDecision {
    RequiresManualReview,
    AutoRouted { status: String },
    /// Routing was attempted and failed. Never silently dropped.
    RoutingFailed { error: String },
}
