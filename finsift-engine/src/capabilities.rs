//! Injected capability seams. The engine consumes these; it never
//! implements a network client of its own. Tests substitute fakes.

use async_trait::async_trait;

use finsift_types::{
    AttachmentMeta, ExtractedFinancialData, MatchFields, MatchResult, MatchedTransaction,
    VendorInsights,
};

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Call timed out")]
    Timeout,

    #[error("Call failed: {0}")]
    Failed(String),
}

/// A remote reconciliation service's answer for one document.
#[derive(Debug, Clone)]
pub struct RemoteMatch {
    pub matched: bool,
    /// In [0, 100].
    pub confidence: f32,
    pub matched_transaction: Option<MatchedTransaction>,
}

/// Remote matching and vendor-insight service. Only this collaborator may
/// ever declare a match found.
#[async_trait]
pub trait RemoteMatcher: Send + Sync {
    async fn check_health(&self) -> bool;

    async fn match_document(&self, fields: &MatchFields) -> Result<RemoteMatch, CapabilityError>;

    async fn vendor_insights(
        &self,
        vendor_name: &str,
    ) -> Result<Option<VendorInsights>, CapabilityError>;
}

/// Fetches an attachment's raw bytes on demand.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch(&self, attachment: &AttachmentMeta) -> Result<Vec<u8>, CapabilityError>;
}

/// Renders one page of a layout document to image bytes, used as a visual
/// surrogate when a document carries no extractable text layer.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render_page(&self, bytes: &[u8], page_index: u32) -> Result<Vec<u8>, CapabilityError>;
}

/// Creates or refreshes a human-review task for an unmatched document.
#[async_trait]
pub trait ExceptionRouter: Send + Sync {
    /// Returns the resulting task status.
    async fn ensure_exception_task(
        &self,
        extracted: &ExtractedFinancialData,
        match_result: &MatchResult,
    ) -> Result<String, CapabilityError>;
}
