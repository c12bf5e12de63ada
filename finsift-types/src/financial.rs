use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::candidate::FieldChoice;
use crate::classification::EmailType;

/// A monetary amount with the currency marker it was found with, when any.
///
/// `currency` keeps the literal symbol or code from the text (`"$"`,
/// `"EUR"`) rather than a canonicalized code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AmountValue {
    pub amount: f64,
    pub currency: Option<String>,
}

impl AmountValue {
    pub fn new(amount: f64, currency: Option<String>) -> Self {
        Self { amount, currency }
    }

    /// The digit sequence of the amount, used for the amount-vs-invoice
    /// conflict check.
    pub fn digit_sequence(&self) -> String {
        format!("{}", self.amount)
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect()
    }
}

/// One transaction-shaped record recovered from a tabular attachment.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatementRow {
    pub transaction_id: String,
    pub date: String,
    pub amount: f64,
    pub description: String,
    pub reference: Option<String>,
}

/// What a vendor-insight collaborator knows about a vendor.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VendorInsights {
    pub vendor_name: String,
    pub document_count: u32,
    pub usual_category: Option<String>,
}

/// The engine's sole externally visible output: one winning choice per
/// field, derived flags, and classification metadata. Immutable once
/// produced; persistence and display belong to external collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExtractedFinancialData {
    pub vendor: FieldChoice<String>,
    pub amount: FieldChoice<AmountValue>,
    pub invoice_number: FieldChoice<String>,
    pub document_date: FieldChoice<String>,
    pub payment_terms: Option<String>,
    pub category: Option<String>,
    pub statement_rows: Vec<StatementRow>,

    // Derived flags
    pub has_attachments: bool,
    pub attachment_text_used: bool,

    // Classification metadata
    pub email_type: EmailType,
    pub classification_reason: Option<String>,
}

impl ExtractedFinancialData {
    pub fn vendor_name(&self) -> Option<&str> {
        self.vendor.as_ref().map(|c| c.value.as_str())
    }

    pub fn amount_value(&self) -> Option<f64> {
        self.amount.as_ref().map(|c| c.value.amount)
    }

    pub fn invoice_number_value(&self) -> Option<&str> {
        self.invoice_number.as_ref().map(|c| c.value.as_str())
    }

    pub fn document_date_value(&self) -> Option<&str> {
        self.document_date.as_ref().map(|c| c.value.as_str())
    }
}
