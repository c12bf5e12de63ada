pub mod candidate;
pub mod classification;
pub mod document;
pub mod error;
pub mod financial;
pub mod matching;

pub use candidate::{CandidateSource, FieldCandidate, FieldChoice};
pub use classification::{ClassificationResult, EmailType};
pub use document::{AttachmentMeta, DocumentInput};
pub use error::ExtractionError;
pub use financial::{
    AmountValue, ExtractedFinancialData, StatementRow, VendorInsights,
};
pub use matching::{
    DataQuality, ExceptionDecision, MatchFields, MatchResult, MatchedTransaction,
};
