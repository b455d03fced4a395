//! Consistency validation: scanning generated prose for blocklisted terms.
//!
//! Matching is case-insensitive substring search, not word-boundary search:
//! "king" is flagged inside "kingdom" as well. Over-flagging is preferred to
//! silently missing leaked vocabulary.

use crate::Blocklist;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// Default number of characters of context captured on each side of a match.
pub const DEFAULT_SNIPPET_RADIUS: usize = 40;

/// Occurrences of one blocklisted term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Violation {
    /// The blocklisted term
    term: String,
    /// Number of non-overlapping matches
    count: usize,
    /// Context around each match, newlines flattened to spaces
    snippets: Vec<String>,
}

/// Result of validating one text against one blocklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ValidationReport {
    /// Violations in blocklist order; terms without matches are absent
    violations: Vec<Violation>,
    /// Number of blocklist terms checked
    terms_checked: usize,
}

impl ValidationReport {
    /// Whether no blocklisted term was found.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Total matches across all terms.
    pub fn total_matches(&self) -> usize {
        self.violations.iter().map(|v| v.count).sum()
    }

    /// The violation for `term`, if it was found.
    pub fn violation(&self, term: &str) -> Option<&Violation> {
        self.violations
            .iter()
            .find(|v| v.term.to_lowercase() == term.to_lowercase())
    }
}

/// Scan `prose` for every blocklist term.
///
/// Pure and deterministic; always succeeds.
///
/// # Examples
///
/// ```
/// use retell_narrative::{validate, Blocklist};
///
/// let blocklist = Blocklist::new(["sword", "castle", "king"]);
/// let report = validate(
///     "The CEO entered the Server Farm wielding a Sword.",
///     &blocklist,
///     40,
/// );
///
/// assert_eq!(report.violations().len(), 1);
/// assert_eq!(report.violations()[0].term(), "sword");
/// assert_eq!(*report.violations()[0].count(), 1);
/// ```
#[tracing::instrument(skip_all, fields(terms = blocklist.len(), prose_chars = prose.len()))]
pub fn validate(prose: &str, blocklist: &Blocklist, snippet_radius: usize) -> ValidationReport {
    let violations: Vec<Violation> = blocklist
        .iter()
        .filter_map(|term| scan_term(prose, term, snippet_radius))
        .collect();

    tracing::debug!(violations = violations.len(), "Validation complete");

    ValidationReport {
        violations,
        terms_checked: blocklist.len(),
    }
}

fn scan_term(prose: &str, term: &str, snippet_radius: usize) -> Option<Violation> {
    // Escaped literal: only the compiled size limit can reject it.
    let pattern = match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::warn!(term, error = %e, "Skipping unmatchable blocklist term");
            return None;
        }
    };

    let snippets: Vec<String> = pattern
        .find_iter(prose)
        .map(|m| snippet(prose, m.start(), m.end(), snippet_radius))
        .collect();

    if snippets.is_empty() {
        return None;
    }

    Some(Violation {
        term: term.to_string(),
        count: snippets.len(),
        snippets,
    })
}

/// Up to `radius` characters on each side of `prose[start..end]`.
fn snippet(prose: &str, start: usize, end: usize, radius: usize) -> String {
    let before_start = prose[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(i, _)| i);
    let after_end = prose[end..]
        .char_indices()
        .nth(radius)
        .map_or(prose.len(), |(i, _)| end + i);

    prose[before_start..after_end]
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
