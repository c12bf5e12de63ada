use std::sync::OnceLock;

use mail_parser::MessageParser;
use regex::Regex;
use tracing::debug;

use finsift_types::ExtractionError;

use super::{looks_binary, AttachmentKind};
use crate::text::{normalize_lines, strip_markup};

/// Extract raw text from attachment bytes, per type. The result keeps line
/// structure; budgets are enforced by the caller.
///
/// Images carry no text layer and always fail here; the caller may fall
/// back to a rendered visual surrogate for document-type attachments.
pub fn extract_attachment_text(
    kind: AttachmentKind,
    bytes: &[u8],
) -> Result<String, ExtractionError> {
    match kind {
        AttachmentKind::Pdf => extract_pdf(bytes),
        AttachmentKind::Image => Err(ExtractionError::UnsupportedAttachment(
            "image has no text layer".to_string(),
        )),
        _ => {
            if looks_binary(bytes) {
                return Err(ExtractionError::InvalidInput(
                    "binary content in text attachment".to_string(),
                ));
            }
            let raw = String::from_utf8_lossy(bytes);
            let text = match kind {
                AttachmentKind::PlainText => raw.into_owned(),
                AttachmentKind::Csv => blank_delimiters(&raw, &[',', ';']),
                AttachmentKind::Tsv => blank_delimiters(&raw, &['\t']),
                AttachmentKind::Html | AttachmentKind::Xml => strip_markup(&raw),
                AttachmentKind::Json => pretty_json(&raw),
                AttachmentKind::Rtf => strip_rtf(&raw),
                AttachmentKind::Eml => extract_message_body(bytes, &raw),
                AttachmentKind::Pdf | AttachmentKind::Image => unreachable!(),
            };
            Ok(normalize_lines(&text))
        }
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::ParseError(format!("pdf text extraction failed: {e}")))?;
    Ok(normalize_lines(&text))
}

fn blank_delimiters(raw: &str, delimiters: &[char]) -> String {
    raw.chars()
        .map(|c| if delimiters.contains(&c) { ' ' } else { c })
        .collect()
}

fn pretty_json(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| raw.to_string())
            .replace(['"', '{', '}', '[', ']'], " "),
        Err(e) => {
            debug!("json attachment did not parse, keeping raw text: {e}");
            raw.to_string()
        }
    }
}

fn rtf_control_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\[a-z]+-?\d*\s?|\\'[0-9a-fA-F]{2}|[{}]").unwrap())
}

fn strip_rtf(raw: &str) -> String {
    rtf_control_re().replace_all(raw, " ").into_owned()
}

/// Isolate a raw message's body: parse it properly, and fall back to
/// everything after the header/body separator when parsing fails.
fn extract_message_body(bytes: &[u8], raw: &str) -> String {
    if let Some(message) = MessageParser::default().parse(bytes) {
        if let Some(body) = message.body_text(0) {
            return body.into_owned();
        }
        if let Some(html) = message.body_html(0) {
            return strip_markup(&html);
        }
    }
    let after_headers = raw
        .split_once("\r\n\r\n")
        .or_else(|| raw.split_once("\n\n"))
        .map(|(_, body)| body)
        .unwrap_or(raw);
    after_headers.to_string()
}
