//! Per-field candidate scanners.
//!
//! Each scanner is a pure function over a text blob returning zero or more
//! scored candidates with surrounding context. Shared tie-break rule:
//! highest score wins, and on exact ties the earlier-occurring match in the
//! text wins.

mod amount;
mod date;
mod invoice;
mod terms;
mod vendor;

pub use amount::{parse_amount_token, scan_amounts};
pub use date::scan_dates;
pub use invoice::{scan_invoice_filenames, scan_invoice_numbers};
pub use terms::scan_payment_terms;
pub use vendor::{scan_vendor_email, scan_vendor_text, score_vendor_name};

use finsift_types::{CandidateSource, FieldCandidate};

/// A candidate before ranking, with its match offset for tie-breaking.
pub(crate) struct RawCandidate<T> {
    pub value: T,
    pub score: i32,
    pub context: String,
    pub position: usize,
}

/// Sort by score descending, then match position ascending, and strip the
/// position.
pub(crate) fn rank<T>(
    mut candidates: Vec<RawCandidate<T>>,
    source: CandidateSource,
) -> Vec<FieldCandidate<T>> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.position.cmp(&b.position)));
    candidates
        .into_iter()
        .map(|c| FieldCandidate::new(c.value, c.score, c.context, source))
        .collect()
}

/// Text window of roughly `radius` bytes around a match, snapped to char
/// boundaries and clipped at line breaks so that a neighboring line's
/// keywords never score this line's match.
pub(crate) fn context_window(text: &str, start: usize, end: usize, radius: usize) -> String {
    let mut from = start.saturating_sub(radius);
    while from > 0 && !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + radius).min(text.len());
    while to < text.len() && !text.is_char_boundary(to) {
        to += 1;
    }
    if let Some(nl) = text[from..start.min(to)].rfind('\n') {
        from += nl + 1;
    }
    if let Some(nl) = text[end.min(to)..to].find('\n') {
        to = end + nl;
    }
    text[from..to].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_prefers_earlier_match_on_tie() {
        let candidates = vec![
            RawCandidate {
                value: "b",
                score: 10,
                context: String::new(),
                position: 50,
            },
            RawCandidate {
                value: "a",
                score: 10,
                context: String::new(),
                position: 5,
            },
            RawCandidate {
                value: "c",
                score: 20,
                context: String::new(),
                position: 90,
            },
        ];
        let ranked = rank(candidates, CandidateSource::Email);
        let order: Vec<&str> = ranked.iter().map(|c| c.value).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_context_window_char_boundaries() {
        let text = "pay €100 now";
        // A radius landing inside the euro sign must not panic
        for radius in 0..6 {
            let _ = context_window(text, 6, 9, radius);
        }
    }
}
