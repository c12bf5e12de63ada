//! Decides what happens to an unmatched document: hold it for manual
//! review, or delegate to an injected routing capability.

use tracing::warn;

use finsift_types::{ExceptionDecision, ExtractedFinancialData, MatchResult};

use crate::capabilities::ExceptionRouter;

/// Route an unmatched document. Routing failure is surfaced as an explicit
/// outcome; an exception is never silently dropped.
pub async fn route_exception(
    extracted: &ExtractedFinancialData,
    match_result: &MatchResult,
    auto_route: bool,
    router: &dyn ExceptionRouter,
) -> ExceptionDecision {
    if !auto_route {
        return ExceptionDecision::RequiresManualReview;
    }

    match router.ensure_exception_task(extracted, match_result).await {
        Ok(status) => ExceptionDecision::AutoRouted { status },
        Err(e) => {
            warn!("exception routing failed: {e}");
            ExceptionDecision::RoutingFailed {
                error: e.to_string(),
            }
        }
    }
}
