//! Attachment triage: type classification from name/mime, relevance
//! scoring, and scoring of extracted text for financial-document
//! likelihood. Byte fetching and budget enforcement live in the engine;
//! everything here is pure.

mod extract;
mod statement;

pub use extract::extract_attachment_text;
pub use statement::parse_statement_rows;

use std::sync::OnceLock;

use regex::Regex;

use finsift_types::AttachmentMeta;

/// Attachment content type as triaged from file name and declared mime
/// type. Unknown types are dropped before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Pdf,
    PlainText,
    Csv,
    Tsv,
    Html,
    Json,
    Xml,
    Rtf,
    Eml,
    Image,
}

impl AttachmentKind {
    /// Fixed per-type triage bonus: layout documents highest, markup and
    /// text next, tabular after, images lowest but still eligible.
    pub fn type_bonus(&self) -> i32 {
        match self {
            AttachmentKind::Pdf => 25,
            AttachmentKind::Html => 18,
            AttachmentKind::PlainText | AttachmentKind::Rtf => 15,
            AttachmentKind::Csv | AttachmentKind::Tsv => 14,
            AttachmentKind::Json | AttachmentKind::Xml | AttachmentKind::Eml => 12,
            AttachmentKind::Image => 4,
        }
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self, AttachmentKind::Csv | AttachmentKind::Tsv)
    }
}

/// Classify an attachment from its declared mime type, falling back to the
/// file extension. Returns `None` for unknown types, which are dropped from
/// triage.
pub fn classify_attachment(meta: &AttachmentMeta) -> Option<AttachmentKind> {
    let mime = meta.mime_type.as_deref().unwrap_or("").to_lowercase();

    let from_mime = if mime.contains("pdf") {
        Some(AttachmentKind::Pdf)
    } else if mime.contains("csv") {
        Some(AttachmentKind::Csv)
    } else if mime.contains("tab-separated") {
        Some(AttachmentKind::Tsv)
    } else if mime.contains("html") {
        Some(AttachmentKind::Html)
    } else if mime.contains("json") {
        Some(AttachmentKind::Json)
    } else if mime.contains("xml") {
        Some(AttachmentKind::Xml)
    } else if mime.contains("rtf") {
        Some(AttachmentKind::Rtf)
    } else if mime.contains("rfc822") {
        Some(AttachmentKind::Eml)
    } else if mime.starts_with("image/") {
        Some(AttachmentKind::Image)
    } else if mime.starts_with("text/") {
        Some(AttachmentKind::PlainText)
    } else {
        None
    };
    if from_mime.is_some() {
        return from_mime;
    }

    match meta.extension()?.as_str() {
        "pdf" => Some(AttachmentKind::Pdf),
        "txt" | "text" | "log" => Some(AttachmentKind::PlainText),
        "csv" => Some(AttachmentKind::Csv),
        "tsv" | "tab" => Some(AttachmentKind::Tsv),
        "html" | "htm" => Some(AttachmentKind::Html),
        "json" => Some(AttachmentKind::Json),
        "xml" => Some(AttachmentKind::Xml),
        "rtf" => Some(AttachmentKind::Rtf),
        "eml" => Some(AttachmentKind::Eml),
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "tiff" | "bmp" => Some(AttachmentKind::Image),
        _ => None,
    }
}

fn high_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)invoice|receipt|statement|bill|remittance").unwrap())
}

fn medium_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)payment|order|subscription").unwrap())
}

/// Rank an attachment's likely relevance before spending extraction budget:
/// name-keyword bonus plus the per-type bonus.
pub fn triage_score(meta: &AttachmentMeta, kind: AttachmentKind) -> i32 {
    let mut score = kind.type_bonus();
    if high_keyword_re().is_match(&meta.name) {
        score += 30;
    } else if medium_keyword_re().is_match(&meta.name) {
        score += 15;
    }
    score
}

/// Binary/undecodable content guard: null bytes, or more than 5% control
/// characters in a leading sample.
pub fn looks_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(4096)];
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }
    let control = sample
        .iter()
        .filter(|&&b| b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r')
        .count();
    control * 20 > sample.len()
}

fn doc_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:invoice|bill|statement|receipt|remittance)\b").unwrap())
}

fn total_phrase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\btotal\b|\bamount\s+due\b|\bbalance\s+due\b").unwrap()
    })
}

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[$€£¥]|(?i)\b(?:usd|eur|gbp|cad|aud|inr)\b").unwrap())
}

/// Score extracted text for financial-document likelihood. Combined with
/// the triage score it decides which extraction attempt is kept; on its own
/// it drives the early-stop threshold.
pub fn score_text_quality(text: &str) -> i32 {
    let len = text.chars().count();
    let mut score = if len >= 1000 {
        15
    } else if len >= 200 {
        10
    } else if len >= 50 {
        5
    } else {
        0
    };

    if doc_word_re().is_match(text) {
        score += 15;
    }
    if total_phrase_re().is_match(text) {
        score += 25;
    }
    if currency_re().is_match(text) {
        score += 15;
    }
    score
}
