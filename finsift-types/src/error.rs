/// Extraction error types. Most input malformation is recovered locally by
/// discarding the offending candidate; these variants cover the few seams
/// where a caller needs to know why an operation produced nothing.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported attachment type: {0}")]
    UnsupportedAttachment(String),

    #[error("Budget exceeded: {0}")]
    BudgetExceeded(String),
}
