//! The linear per-document pipeline: classify, gather attachment evidence,
//! scan and arbitrate fields, reconcile against the remote matcher, and
//! route exceptions. Each stage is checked explicitly; the only halt is a
//! terminal classification.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use finsift_extractors::scanners::{
    scan_amounts, scan_dates, scan_invoice_filenames, scan_invoice_numbers, scan_payment_terms,
    scan_vendor_email, scan_vendor_text,
};
use finsift_extractors::text::{normalize_lines, strip_markup, truncate_chars};
use finsift_extractors::{
    arbitrate, classify_attachment, extract_attachment_text, parse_statement_rows, score_text_quality,
    suggest_category, suppress_amount_invoice_conflict, triage_score, AttachmentKind,
    EmailClassifier,
};
use finsift_types::{
    AttachmentMeta, CandidateSource, ClassificationResult, DataQuality, DocumentInput,
    ExceptionDecision, ExtractedFinancialData, FieldCandidate, MatchFields, MatchResult,
    StatementRow, VendorInsights,
};

use crate::capabilities::{AttachmentFetcher, ExceptionRouter, PageRenderer, RemoteMatcher};
use crate::config::EngineConfig;
use crate::exception::route_exception;
use crate::fallback::score_local_match;

/// The injected collaborators one pipeline invocation talks to.
pub struct Capabilities<'a> {
    pub matcher: &'a dyn RemoteMatcher,
    pub fetcher: &'a dyn AttachmentFetcher,
    pub renderer: Option<&'a dyn PageRenderer>,
    pub router: &'a dyn ExceptionRouter,
}

/// Everything one pipeline invocation produced. Persistence, display, and
/// transport formatting belong to the caller.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub classification: ClassificationResult,
    pub extracted: Option<ExtractedFinancialData>,
    pub match_result: Option<MatchResult>,
    pub vendor_insights: Option<VendorInsights>,
    pub exception: Option<ExceptionDecision>,
    /// Rendered first page of a layout document with no text layer, for
    /// the remote collaborator.
    pub page_surrogate: Option<Vec<u8>>,
}

impl PipelineOutcome {
    fn halted(classification: ClassificationResult) -> Self {
        Self {
            classification,
            extracted: None,
            match_result: None,
            vendor_insights: None,
            exception: None,
            page_surrogate: None,
        }
    }
}

/// Stage gate: a non-finance or ignored classification is terminal, not an
/// error.
enum Flow {
    Continue(ClassificationResult),
    Halt(ClassificationResult),
}

#[derive(Default)]
struct AttachmentEvidence {
    text: String,
    source_name: Option<String>,
    quality: i32,
    statement_rows: Vec<StatementRow>,
    surrogate: Option<Vec<u8>>,
    failure_reason: Option<String>,
}

pub struct FinancialPipeline {
    config: EngineConfig,
    classifier: EmailClassifier,
}

impl FinancialPipeline {
    pub fn new(config: EngineConfig) -> Self {
        let classifier = EmailClassifier::new(config.denylisted_domains.clone());
        Self { config, classifier }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one document end to end. Never fails: the worst outcomes
    /// are a terminal classification or an all-null extraction.
    pub async fn process(
        &self,
        document: &DocumentInput,
        caps: &Capabilities<'_>,
    ) -> PipelineOutcome {
        let body = self.body_text(document);

        let classification = match self.classify(document, &body) {
            Flow::Halt(classification) => {
                info!(
                    email_type = ?classification.email_type,
                    "classification halted pipeline"
                );
                return PipelineOutcome::halted(classification);
            }
            Flow::Continue(classification) => classification,
        };

        let evidence = self.gather_attachment_evidence(document, caps).await;
        let extracted = self.extract_fields(document, &body, &evidence, &classification);

        let (match_result, vendor_insights) = self.reconcile(&extracted, caps.matcher).await;

        let exception = if match_result.found {
            None
        } else {
            Some(
                route_exception(
                    &extracted,
                    &match_result,
                    self.config.auto_route_exceptions,
                    caps.router,
                )
                .await,
            )
        };

        PipelineOutcome {
            classification,
            extracted: Some(extracted),
            match_result: Some(match_result),
            vendor_insights,
            exception,
            page_surrogate: evidence.surrogate,
        }
    }

    /// Plain body when present, markup-stripped HTML body otherwise.
    fn body_text(&self, document: &DocumentInput) -> String {
        let plain = document.plain_body();
        if !plain.trim().is_empty() {
            normalize_lines(plain)
        } else {
            strip_markup(document.html_body())
        }
    }

    fn classify(&self, document: &DocumentInput, body: &str) -> Flow {
        let classification =
            self.classifier
                .classify(&document.subject, body, &document.sender_email);
        if classification.email_type.halts_pipeline() {
            Flow::Halt(classification)
        } else {
            Flow::Continue(classification)
        }
    }

    /// Triage attachments, then attempt extraction on the top candidates
    /// under the byte/page/char budgets. No usable text is not an error;
    /// downstream stages proceed on email text alone.
    async fn gather_attachment_evidence(
        &self,
        document: &DocumentInput,
        caps: &Capabilities<'_>,
    ) -> AttachmentEvidence {
        let budget = &self.config.attachments;
        let mut evidence = AttachmentEvidence::default();

        let mut ranked: Vec<(usize, &AttachmentMeta, AttachmentKind, i32)> = document
            .attachments
            .iter()
            .enumerate()
            .filter_map(|(idx, meta)| {
                classify_attachment(meta).map(|kind| (idx, meta, kind, triage_score(meta, kind)))
            })
            .collect();
        ranked.sort_by(|a, b| b.3.cmp(&a.3).then(a.0.cmp(&b.0)));

        let mut best: Option<(i32, String, String, i32)> = None;

        for (_, meta, kind, attachment_score) in ranked.into_iter().take(budget.top_candidates) {
            if meta.size_hint.map(|s| s > budget.max_bytes).unwrap_or(false) {
                evidence.failure_reason = Some(format!("{} exceeds byte budget", meta.name));
                continue;
            }

            let mut bytes = match caps.fetcher.fetch(meta).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(name = %meta.name, "attachment fetch failed: {e}");
                    evidence.failure_reason = Some(format!("fetch failed for {}", meta.name));
                    continue;
                }
            };
            if bytes.len() as u64 > budget.max_bytes {
                if matches!(kind, AttachmentKind::Pdf | AttachmentKind::Image) {
                    evidence.failure_reason = Some(format!("{} exceeds byte budget", meta.name));
                    continue;
                }
                bytes.truncate(budget.max_bytes as usize);
            }

            if kind.is_tabular() {
                let delimiter = if kind == AttachmentKind::Tsv { b'\t' } else { b',' };
                let rows = parse_statement_rows(&bytes, delimiter);
                debug!(name = %meta.name, rows = rows.len(), "parsed statement rows");
                evidence.statement_rows.extend(rows);
            }

            let text = match extract_attachment_text(kind, &bytes) {
                Ok(text) => text,
                Err(e) => {
                    debug!(name = %meta.name, "attachment text extraction failed: {e}");
                    evidence.failure_reason = Some(e.to_string());
                    if kind == AttachmentKind::Pdf && evidence.surrogate.is_none() {
                        evidence.surrogate = self.render_surrogate(&bytes, caps.renderer).await;
                    }
                    continue;
                }
            };
            let text = truncate_chars(&text, budget.max_chars).to_string();
            if text.trim().is_empty() {
                evidence.failure_reason = Some(format!("no text in {}", meta.name));
                if kind == AttachmentKind::Pdf && evidence.surrogate.is_none() {
                    evidence.surrogate = self.render_surrogate(&bytes, caps.renderer).await;
                }
                continue;
            }

            let quality = score_text_quality(&text);
            let combined = attachment_score + quality;
            debug!(name = %meta.name, quality, combined, "extraction attempt scored");

            if best.as_ref().map(|(c, ..)| combined > *c).unwrap_or(true) {
                best = Some((combined, text, meta.name.clone(), quality));
            }
            if quality >= budget.early_stop_quality {
                break;
            }
        }

        match best {
            Some((_, text, name, quality)) => {
                evidence.text = text;
                evidence.source_name = Some(name);
                evidence.quality = quality;
                evidence.failure_reason = None;
            }
            None => {
                if let Some(reason) = &evidence.failure_reason {
                    info!(%reason, "attachment evidence unavailable");
                }
            }
        }
        evidence
    }

    async fn render_surrogate(
        &self,
        bytes: &[u8],
        renderer: Option<&dyn PageRenderer>,
    ) -> Option<Vec<u8>> {
        if self.config.attachments.max_pages == 0 {
            return None;
        }
        match renderer?.render_page(bytes, 0).await {
            Ok(image) => Some(image),
            Err(e) => {
                debug!("page render failed: {e}");
                None
            }
        }
    }

    /// Run every scanner over the email blob and the attachment blob, then
    /// arbitrate per field and suppress the amount/invoice digit conflict.
    fn extract_fields(
        &self,
        document: &DocumentInput,
        body: &str,
        evidence: &AttachmentEvidence,
        classification: &ClassificationResult,
    ) -> ExtractedFinancialData {
        let cfg = &self.config.arbiter;
        let email_text = format!("{}\n{}", document.subject, body);
        let attachment_text = evidence.text.as_str();
        if let Some(name) = &evidence.source_name {
            debug!(source = %name, quality = evidence.quality, "using attachment text evidence");
        }
        let attachment_names: Vec<String> =
            document.attachments.iter().map(|a| a.name.clone()).collect();

        let vendor = arbitrate(
            scan_vendor_email(
                &document.subject,
                body,
                &document.sender_name,
                &document.sender_email,
            )
            .into_iter()
            .next(),
            scan_vendor_text(attachment_text, CandidateSource::Attachment)
                .into_iter()
                .next(),
            cfg.low_confidence_floor,
            cfg.vendor_margin,
        );

        let amount = arbitrate(
            scan_amounts(&email_text, CandidateSource::Email).into_iter().next(),
            scan_amounts(attachment_text, CandidateSource::Attachment)
                .into_iter()
                .next(),
            cfg.low_confidence_floor,
            cfg.amount_margin,
        );

        let invoice_from_attachment = best_of(
            scan_invoice_numbers(attachment_text, CandidateSource::Attachment)
                .into_iter()
                .next(),
            scan_invoice_filenames(&attachment_names).into_iter().next(),
        );
        let invoice_number = arbitrate(
            scan_invoice_numbers(&email_text, CandidateSource::Email)
                .into_iter()
                .next(),
            invoice_from_attachment,
            cfg.low_confidence_floor,
            cfg.invoice_margin,
        );

        let document_date = arbitrate(
            scan_dates(&email_text, CandidateSource::Email).into_iter().next(),
            scan_dates(attachment_text, CandidateSource::Attachment)
                .into_iter()
                .next(),
            cfg.low_confidence_floor,
            cfg.date_margin,
        );

        let amount = suppress_amount_invoice_conflict(amount, &invoice_number);

        let payment_terms =
            scan_payment_terms(&email_text).or_else(|| scan_payment_terms(attachment_text));
        let category = suggest_category(
            vendor.as_ref().map(|c| c.value.as_str()),
            &document.subject,
            &self.config.accounts,
        );

        ExtractedFinancialData {
            vendor,
            amount,
            invoice_number,
            document_date,
            payment_terms,
            category,
            statement_rows: evidence.statement_rows.clone(),
            has_attachments: document.has_attachments(),
            attachment_text_used: !evidence.text.is_empty(),
            email_type: classification.email_type,
            classification_reason: classification.reason.clone(),
        }
    }

    /// Try the remote matcher under the configured timeout; any failure
    /// falls through to the local confidence-only score.
    async fn reconcile(
        &self,
        extracted: &ExtractedFinancialData,
        matcher: &dyn RemoteMatcher,
    ) -> (MatchResult, Option<VendorInsights>) {
        let limit = Duration::from_secs(self.config.remote_timeout_secs);

        let healthy = matches!(timeout(limit, matcher.check_health()).await, Ok(true));
        if !healthy {
            info!("remote matcher unreachable, scoring locally");
            return (score_local_match(extracted), None);
        }

        let fields = MatchFields::of(extracted);
        let match_result = match timeout(limit, matcher.match_document(&fields)).await {
            Ok(Ok(remote)) => {
                if remote.matched {
                    MatchResult {
                        found: true,
                        confidence: remote.confidence,
                        matched_transaction: remote.matched_transaction,
                        data_quality: None,
                        reason: None,
                    }
                } else {
                    MatchResult {
                        found: false,
                        confidence: remote.confidence,
                        matched_transaction: None,
                        data_quality: Some(DataQuality::of(extracted)),
                        reason: Some("remote matcher found no counterpart".to_string()),
                    }
                }
            }
            Ok(Err(e)) => {
                warn!("remote match failed: {e}");
                score_local_match(extracted)
            }
            Err(_) => {
                warn!("remote match timed out");
                score_local_match(extracted)
            }
        };

        let vendor_insights = match extracted.vendor_name() {
            Some(vendor) => match timeout(limit, matcher.vendor_insights(vendor)).await {
                Ok(Ok(insights)) => insights,
                Ok(Err(e)) => {
                    debug!("vendor insights failed: {e}");
                    None
                }
                Err(_) => None,
            },
            None => None,
        };

        (match_result, vendor_insights)
    }
}

fn best_of<T>(
    a: Option<FieldCandidate<T>>,
    b: Option<FieldCandidate<T>>,
) -> Option<FieldCandidate<T>> {
    match (a, b) {
        (Some(a), Some(b)) => {
            if b.score > a.score {
                Some(b)
            } else {
                Some(a)
            }
        }
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;

    use crate::capabilities::{CapabilityError, ExceptionRouter, RemoteMatch};
    use finsift_types::{EmailType, MatchedTransaction};

    struct FakeRemote {
        healthy: bool,
        answer: Option<RemoteMatch>,
        insights: Option<VendorInsights>,
    }

    impl FakeRemote {
        fn down() -> Self {
            Self {
                healthy: false,
                answer: None,
                insights: None,
            }
        }

        fn answering(answer: RemoteMatch) -> Self {
            Self {
                healthy: true,
                answer: Some(answer),
                insights: None,
            }
        }
    }

    #[async_trait]
    impl RemoteMatcher for FakeRemote {
        async fn check_health(&self) -> bool {
            self.healthy
        }

        async fn match_document(
            &self,
            _fields: &MatchFields,
        ) -> Result<RemoteMatch, CapabilityError> {
            self.answer
                .clone()
                .ok_or_else(|| CapabilityError::Failed("no answer configured".to_string()))
        }

        async fn vendor_insights(
            &self,
            _vendor_name: &str,
        ) -> Result<Option<VendorInsights>, CapabilityError> {
            Ok(self.insights.clone())
        }
    }

    #[derive(Default)]
    struct MapFetcher {
        files: HashMap<String, Vec<u8>>,
    }

    impl MapFetcher {
        fn with(name: &str, bytes: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(name.to_string(), bytes.to_vec());
            Self { files }
        }
    }

    #[async_trait]
    impl AttachmentFetcher for MapFetcher {
        async fn fetch(&self, attachment: &AttachmentMeta) -> Result<Vec<u8>, CapabilityError> {
            self.files
                .get(&attachment.name)
                .cloned()
                .ok_or_else(|| CapabilityError::Failed("unknown attachment".to_string()))
        }
    }

    struct FakeRouter {
        fail: bool,
    }

    #[async_trait]
    impl ExceptionRouter for FakeRouter {
        async fn ensure_exception_task(
            &self,
            _extracted: &ExtractedFinancialData,
            _match_result: &MatchResult,
        ) -> Result<String, CapabilityError> {
            if self.fail {
                Err(CapabilityError::Failed("task backend rejected".to_string()))
            } else {
                Ok("queued".to_string())
            }
        }
    }

    fn document(subject: &str, body: &str, sender: &str) -> DocumentInput {
        DocumentInput {
            subject: subject.to_string(),
            body_text: Some(body.to_string()),
            body_html: None,
            sender_email: sender.to_string(),
            sender_name: String::new(),
            attachments: vec![],
        }
    }

    fn attachment(name: &str, mime: &str) -> AttachmentMeta {
        AttachmentMeta {
            name: name.to_string(),
            mime_type: Some(mime.to_string()),
            size_hint: None,
        }
    }

    #[tokio::test]
    async fn test_invoice_email_end_to_end() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let pipeline = FinancialPipeline::new(EngineConfig::default());
        let remote = FakeRemote::answering(RemoteMatch {
            matched: true,
            confidence: 93.0,
            matched_transaction: Some(MatchedTransaction {
                source: "ledger".to_string(),
                id: "tx-991".to_string(),
            }),
        });
        let fetcher = MapFetcher::default();
        let router = FakeRouter { fail: false };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        let doc = document(
            "Invoice #INV-2024-0892 from AWS",
            "Total: $12,847.32",
            "billing@amazon.com",
        );
        let outcome = pipeline.process(&doc, &caps).await;

        assert_eq!(outcome.classification.email_type, EmailType::Invoice);
        assert!((outcome.classification.confidence - 0.9).abs() < f32::EPSILON);

        let extracted = outcome.extracted.unwrap();
        assert_eq!(extracted.vendor_name(), Some("AWS"));
        // a chosen vendor is never "absent" by the scorer's own rule
        assert!(
            finsift_extractors::scanners::score_vendor_name(extracted.vendor_name().unwrap()) > 0
        );

        let amount = extracted.amount.as_ref().unwrap();
        assert!((amount.value.amount - 12847.32).abs() < 1e-9);
        assert_eq!(amount.value.currency.as_deref(), Some("$"));
        assert_eq!(amount.source, CandidateSource::Email);

        assert_eq!(extracted.invoice_number_value(), Some("INV-2024-0892"));
        assert!(!extracted.has_attachments);
        assert!(!extracted.attachment_text_used);

        let match_result = outcome.match_result.unwrap();
        assert!(match_result.found);
        assert!(outcome.exception.is_none());
    }

    #[tokio::test]
    async fn test_denylisted_sender_halts_before_extraction() {
        let config = EngineConfig {
            denylisted_domains: vec!["spam.example.com".to_string()],
            ..EngineConfig::default()
        };
        let pipeline = FinancialPipeline::new(config);
        let remote = FakeRemote::down();
        let fetcher = MapFetcher::default();
        let router = FakeRouter { fail: false };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        let doc = document(
            "Invoice payment receipt",
            "Amount due: $99",
            "billing@spam.example.com",
        );
        let outcome = pipeline.process(&doc, &caps).await;

        assert_eq!(outcome.classification.email_type, EmailType::Ignored);
        assert!(outcome.extracted.is_none());
        assert!(outcome.match_result.is_none());
        assert!(outcome.exception.is_none());
    }

    #[tokio::test]
    async fn test_non_finance_halts() {
        let pipeline = FinancialPipeline::new(EngineConfig::default());
        let remote = FakeRemote::down();
        let fetcher = MapFetcher::default();
        let router = FakeRouter { fail: false };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        let doc = document(
            "Our spring newsletter",
            "Unsubscribe at any time.",
            "news@example.com",
        );
        let outcome = pipeline.process(&doc, &caps).await;

        assert_eq!(outcome.classification.email_type, EmailType::NonFinance);
        assert!(outcome.extracted.is_none());
    }

    #[tokio::test]
    async fn test_unknown_classification_still_extracts() {
        let pipeline = FinancialPipeline::new(EngineConfig::default());
        let remote = FakeRemote::down();
        let fetcher = MapFetcher::default();
        let router = FakeRouter { fail: false };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        let doc = document("Lunch on Friday?", "Does noon work?", "friend@example.com");
        let outcome = pipeline.process(&doc, &caps).await;

        assert_eq!(outcome.classification.email_type, EmailType::Unknown);
        let extracted = outcome.extracted.unwrap();
        assert!(extracted.amount.is_none());

        // no amount means zero local confidence
        let match_result = outcome.match_result.unwrap();
        assert!(!match_result.found);
        assert_eq!(match_result.confidence, 0.0);
        assert_eq!(match_result.reason.as_deref(), Some("no amount detected"));
    }

    #[tokio::test]
    async fn test_remote_down_uses_local_quality_score() {
        let pipeline = FinancialPipeline::new(EngineConfig::default());
        let remote = FakeRemote::down();
        let fetcher = MapFetcher::default();
        let router = FakeRouter { fail: false };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        // amount + invoice number + vendor present, no date: 40+25+20
        let doc = document(
            "Invoice #INV-2024-0892 from AWS",
            "Total: $12,847.32",
            "billing@amazon.com",
        );
        let outcome = pipeline.process(&doc, &caps).await;

        let match_result = outcome.match_result.unwrap();
        assert!(!match_result.found);
        assert_eq!(match_result.confidence, 85.0);
        assert_eq!(
            outcome.exception,
            Some(ExceptionDecision::RequiresManualReview)
        );
    }

    #[tokio::test]
    async fn test_attachment_filename_supplies_invoice_number() {
        let pipeline = FinancialPipeline::new(EngineConfig::default());
        let remote = FakeRemote::answering(RemoteMatch {
            matched: true,
            confidence: 90.0,
            matched_transaction: None,
        });
        let fetcher = MapFetcher::with(
            "invoice-2024-0892.txt",
            b"Amount due: $450.00\nVendor: Initech GmbH\n",
        );
        let router = FakeRouter { fail: false };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        let mut doc = document(
            "Your invoice is attached",
            "Please see the attached file.",
            "accounts@initech.example",
        );
        doc.attachments
            .push(attachment("invoice-2024-0892.txt", "text/plain"));

        let outcome = pipeline.process(&doc, &caps).await;
        let extracted = outcome.extracted.unwrap();

        let invoice = extracted.invoice_number.as_ref().unwrap();
        assert_eq!(invoice.value, "2024-0892");
        assert_eq!(invoice.source, CandidateSource::Attachment);

        let amount = extracted.amount.as_ref().unwrap();
        assert!((amount.value.amount - 450.0).abs() < 1e-9);
        assert_eq!(amount.source, CandidateSource::Attachment);

        assert_eq!(extracted.vendor_name(), Some("Initech GmbH"));
        assert!(extracted.attachment_text_used);
        assert!(extracted.has_attachments);
    }

    #[tokio::test]
    async fn test_amount_matching_invoice_digits_is_suppressed() {
        let pipeline = FinancialPipeline::new(EngineConfig::default());
        let remote = FakeRemote::down();
        let fetcher = MapFetcher::default();
        let router = FakeRouter { fail: false };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        let doc = document(
            "Invoice",
            "Invoice no: INV-2024\nTotal: $2,024",
            "billing@vendor.example",
        );
        let outcome = pipeline.process(&doc, &caps).await;
        let extracted = outcome.extracted.unwrap();

        assert_eq!(extracted.invoice_number_value(), Some("INV-2024"));
        assert!(extracted.amount.is_none());

        // with the amount suppressed the local score degrades to zero
        assert_eq!(outcome.match_result.unwrap().confidence, 0.0);
    }

    #[tokio::test]
    async fn test_csv_statement_rows_extracted() {
        let pipeline = FinancialPipeline::new(EngineConfig::default());
        let remote = FakeRemote::down();
        let fetcher = MapFetcher::with(
            "statement.csv",
            b"date,amount,description,reference\n\
              2024-03-01,42.50,Cloud hosting,TXN-1\n\
              2024-03-02,19.99,Object storage,TXN-2\n",
        );
        let router = FakeRouter { fail: false };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        let mut doc = document(
            "Your monthly statement",
            "Balance due: EUR 250",
            "bank@example.com",
        );
        doc.attachments.push(attachment("statement.csv", "text/csv"));

        let outcome = pipeline.process(&doc, &caps).await;
        let extracted = outcome.extracted.unwrap();

        assert_eq!(extracted.statement_rows.len(), 2);
        assert!(extracted
            .statement_rows
            .iter()
            .all(|row| !row.transaction_id.is_empty()));
        assert_eq!(extracted.statement_rows[0].description, "Cloud hosting");
    }

    #[tokio::test]
    async fn test_unmatched_document_auto_routes_when_enabled() {
        let config = EngineConfig {
            auto_route_exceptions: true,
            ..EngineConfig::default()
        };
        let pipeline = FinancialPipeline::new(config);
        let remote = FakeRemote::answering(RemoteMatch {
            matched: false,
            confidence: 12.0,
            matched_transaction: None,
        });
        let fetcher = MapFetcher::default();
        let router = FakeRouter { fail: false };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        let doc = document("Invoice 9921", "Total: $50.00", "billing@vendor.example");
        let outcome = pipeline.process(&doc, &caps).await;

        let match_result = outcome.match_result.unwrap();
        assert!(!match_result.found);
        assert!(match_result.data_quality.is_some());
        assert_eq!(
            outcome.exception,
            Some(ExceptionDecision::AutoRouted {
                status: "queued".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_routing_failure_is_explicit() {
        let config = EngineConfig {
            auto_route_exceptions: true,
            ..EngineConfig::default()
        };
        let pipeline = FinancialPipeline::new(config);
        let remote = FakeRemote::down();
        let fetcher = MapFetcher::default();
        let router = FakeRouter { fail: true };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        let doc = document("Invoice 9921", "Total: $50.00", "billing@vendor.example");
        let outcome = pipeline.process(&doc, &caps).await;

        match outcome.exception {
            Some(ExceptionDecision::RoutingFailed { error }) => {
                assert!(error.contains("task backend rejected"));
            }
            other => panic!("expected routing failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_vendor_insights_attached_when_remote_healthy() {
        let pipeline = FinancialPipeline::new(EngineConfig::default());
        let remote = FakeRemote {
            healthy: true,
            answer: Some(RemoteMatch {
                matched: true,
                confidence: 88.0,
                matched_transaction: None,
            }),
            insights: Some(VendorInsights {
                vendor_name: "AWS".to_string(),
                document_count: 14,
                usual_category: Some("Software & SaaS".to_string()),
            }),
        };
        let fetcher = MapFetcher::default();
        let router = FakeRouter { fail: false };
        let caps = Capabilities {
            matcher: &remote,
            fetcher: &fetcher,
            renderer: None,
            router: &router,
        };

        let doc = document(
            "Invoice #INV-2024-0892 from AWS",
            "Total: $12,847.32",
            "billing@amazon.com",
        );
        let outcome = pipeline.process(&doc, &caps).await;

        let insights = outcome.vendor_insights.unwrap();
        assert_eq!(insights.vendor_name, "AWS");
        assert_eq!(insights.document_count, 14);
    }
}
