use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which text blob a candidate was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum CandidateSource {
    Email,
    Attachment,
}

/// A provisional extracted value for one field, carrying a heuristic score
/// and provenance. Produced fresh per extraction call.
///
/// `score` is an unbounded signed heuristic, higher is better. `context` is
/// the surrounding text window the value was matched in, kept for audit and
/// tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldCandidate<T> {
    pub value: T,
    pub score: i32,
    pub context: String,
    pub source: CandidateSource,
}

impl<T> FieldCandidate<T> {
    pub fn new(value: T, score: i32, context: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            value,
            score,
            context: context.into(),
            source,
        }
    }
}

/// The arbiter's output for one field: the winning candidate, or `None`
/// when nothing cleared the acceptance threshold.
pub type FieldChoice<T> = Option<FieldCandidate<T>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&CandidateSource::Attachment).unwrap();
        assert_eq!(json, "\"attachment\"");
    }

    #[test]
    fn test_candidate_roundtrip() {
        let cand = FieldCandidate::new("Acme Corp".to_string(), 24, "from Acme Corp", CandidateSource::Email);
        let json = serde_json::to_string(&cand).unwrap();
        let back: FieldCandidate<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cand);
    }
}
