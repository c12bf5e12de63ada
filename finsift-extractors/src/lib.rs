//! Finsift extractors crate
//!
//! Pure, synchronous extraction logic for inbound financial documents:
//! text normalization, finance-relevance classification, per-field candidate
//! scanners, cross-source arbitration, attachment triage and text
//! extraction, statement-row parsing, and ledger categorization.
//!
//! # Architecture
//!
//! - **Types**: the shared data model lives in the `finsift-types` crate
//! - **Implementations**: every function here is a pure function of its
//!   inputs; fetching attachment bytes and calling remote services belong
//!   to the `finsift-engine` crate
//!
//! # Example
//!
//! ```rust,ignore
//! use finsift_extractors::{EmailClassifier, scanners};
//! use finsift_types::CandidateSource;
//!
//! let classifier = EmailClassifier::new(vec![]);
//! let result = classifier.classify(subject, body, sender);
//! let amounts = scanners::scan_amounts(body, CandidateSource::Email);
//! ```

pub mod arbiter;
pub mod attachment;
pub mod categorize;
pub mod classifier;
pub mod scanners;
pub mod text;

// Re-export commonly used entry points
pub use arbiter::{arbitrate, suppress_amount_invoice_conflict, ArbiterConfig};
pub use attachment::{
    classify_attachment, extract_attachment_text, parse_statement_rows, score_text_quality,
    triage_score, AttachmentKind,
};
pub use categorize::{suggest_category, LedgerAccount};
pub use classifier::EmailClassifier;
