use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The finance-relevance judgment for one inbound document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum EmailType {
    Invoice,
    Receipt,
    Payment,
    Statement,
    Financial,
    NonFinance,
    Ignored,
    Unknown,
}

impl EmailType {
    /// Finance-relevant types enter the extraction pipeline.
    pub fn is_finance(&self) -> bool {
        matches!(
            self,
            EmailType::Invoice
                | EmailType::Receipt
                | EmailType::Payment
                | EmailType::Statement
                | EmailType::Financial
        )
    }

    /// Terminal classifications: downstream stages must not run.
    pub fn halts_pipeline(&self) -> bool {
        matches!(self, EmailType::NonFinance | EmailType::Ignored)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClassificationResult {
    pub email_type: EmailType,
    /// In [0, 1].
    pub confidence: f32,
    pub reason: Option<String>,
}

impl ClassificationResult {
    pub fn new(email_type: EmailType, confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            email_type,
            confidence,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_type_serialization() {
        let json = serde_json::to_string(&EmailType::NonFinance).unwrap();
        assert_eq!(json, "\"non-finance\"");

        let back: EmailType = serde_json::from_str("\"invoice\"").unwrap();
        assert_eq!(back, EmailType::Invoice);
    }

    #[test]
    fn test_halt_types() {
        assert!(EmailType::Ignored.halts_pipeline());
        assert!(EmailType::NonFinance.halts_pipeline());
        assert!(!EmailType::Unknown.halts_pipeline());
        assert!(EmailType::Invoice.is_finance());
        assert!(!EmailType::Unknown.is_finance());
    }
}
