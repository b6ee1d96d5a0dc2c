//! Reference marker extraction.
//!
//! # Responsibility
//! - Pull `[[Title]]` reference strings out of free-form note content.
//!
//! # Invariants
//! - Markers are matched left-to-right and never overlap.
//! - The captured text is verbatim: no trimming, no case folding.
//! - Repeated markers are all reported, in position order.
//! - A body stops at the first `]`; titles containing `]` are not captured.

use once_cell::sync::Lazy;
use regex::Regex;

static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("valid reference regex"));

const MARKER_OPEN: &str = "[[";
const MARKER_CLOSE: &str = "]]";

/// Lazily yields every reference string in `content`.
///
/// Each call starts a fresh scan, so the sequence can be replayed.
pub fn references(content: &str) -> impl Iterator<Item = &str> + '_ {
    REFERENCE_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Collects every reference string in `content` in marker order.
pub fn parse_references(content: &str) -> Vec<String> {
    references(content).map(str::to_string).collect()
}

/// Reports marker bodies that contain a stray `]` and were therefore skipped.
///
/// Diagnostic only: content is never rejected for these.
pub fn malformed_markers(content: &str) -> Vec<String> {
    let captured: Vec<(usize, usize)> = REFERENCE_RE
        .find_iter(content)
        .map(|m| (m.start(), m.end()))
        .collect();

    let mut malformed = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = content[cursor..].find(MARKER_OPEN) {
        let open = cursor + offset;
        if let Some(&(_, end)) = captured
            .iter()
            .find(|(start, end)| open >= *start && open < *end)
        {
            cursor = end;
            continue;
        }

        let body_start = open + MARKER_OPEN.len();
        let Some(close_offset) = content[body_start..].find(MARKER_CLOSE) else {
            break;
        };
        let body = &content[body_start..body_start + close_offset];
        if body.contains(']') && !body.contains(MARKER_OPEN) {
            malformed.push(body.to_string());
            cursor = body_start + close_offset + MARKER_CLOSE.len();
        } else {
            cursor = body_start;
        }
    }
    malformed
}
