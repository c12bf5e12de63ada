use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One inbound document: an email's envelope and content plus attached files.
///
/// Immutable, externally supplied. Missing bodies are treated as empty
/// strings everywhere downstream.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentInput {
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    pub sender_email: String,
    pub sender_name: String,
    pub attachments: Vec<AttachmentMeta>,
}

impl DocumentInput {
    pub fn plain_body(&self) -> &str {
        self.body_text.as_deref().unwrap_or("")
    }

    pub fn html_body(&self) -> &str {
        self.body_html.as_deref().unwrap_or("")
    }

    /// Domain part of the sender address, without mailbox or angle brackets.
    pub fn sender_domain(&self) -> &str {
        self.sender_email
            .rsplit('@')
            .next()
            .unwrap_or("")
            .trim_end_matches('>')
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// Metadata for a single attached file. The raw bytes are fetched on demand
/// through an injected `AttachmentFetcher`; this struct is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttachmentMeta {
    pub name: String,
    pub mime_type: Option<String>,
    pub size_hint: Option<u64>,
}

impl AttachmentMeta {
    /// Lower-cased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.name.rsplit('/').next().unwrap_or(&self.name);
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
