//! Source-world vocabulary treated as leakage in generated prose.

use retell_error::{RetellResult, StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Vocabulary of the source play, checked by default on every run.
pub const DEFAULT_TERMS: &[&str] = &[
    "sword", "dagger", "witch", "witches", "castle", "king", "queen", "throne", "crown",
    "dungeon", "knight", "lord", "lady", "thy", "thou", "hast", "hath", "doth", "wherefore",
    "methinks", "prithee", "heath", "cauldron", "potion", "spell", "prophecy", "apparition",
    "banquo", "macbeth", "macduff", "malcolm", "duncan", "fleance", "scotland", "scottish",
    "thane", "cawdor", "glamis", "birnam", "dunsinane", "fife", "inverness",
];

/// An ordered set of case-insensitive terms.
///
/// Terms are trimmed; blank terms are dropped and a term equal (ignoring case)
/// to an earlier one is skipped, so insertion order is the report order.
///
/// # Examples
///
/// ```
/// use retell_narrative::Blocklist;
///
/// let blocklist = Blocklist::new(["Sword", " castle ", "sword", ""]);
/// assert_eq!(blocklist.terms(), ["Sword", "castle"]);
/// assert!(blocklist.contains("SWORD"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Blocklist {
    terms: Vec<String>,
}

impl Blocklist {
    /// Build a blocklist from arbitrary terms.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut blocklist = Self::default();
        blocklist.extend(terms);
        blocklist
    }

    /// The built-in source vocabulary.
    pub fn default_terms() -> Self {
        Self::new(DEFAULT_TERMS)
    }

    /// Add terms, skipping blanks and case-insensitive duplicates.
    pub fn extend<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref().trim();
            if !term.is_empty() && !self.contains(term) {
                self.terms.push(term.to_string());
            }
        }
    }

    /// Parse a blocklist file: one term per line, `#` starts a comment.
    pub fn parse(contents: &str) -> Self {
        Self::new(
            contents
                .lines()
                .map(|line| line.split_once('#').map_or(line, |(term, _)| term)),
        )
    }

    /// Read and parse a blocklist file.
    #[tracing::instrument(fields(path = %path.as_ref().display()), skip(path))]
    pub fn from_file(path: impl AsRef<Path>) -> RetellResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        let blocklist = Self::parse(&contents);
        tracing::debug!(terms = blocklist.len(), "Loaded blocklist file");
        Ok(blocklist)
    }

    /// Whether `term` is present, ignoring case.
    pub fn contains(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        self.terms.iter().any(|t| t.to_lowercase() == term)
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the blocklist has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over the terms.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for Blocklist {
    fn from(terms: Vec<String>) -> Self {
        Self::new(terms)
    }
}

impl From<Blocklist> for Vec<String> {
    fn from(blocklist: Blocklist) -> Self {
        blocklist.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_terms_are_unique() {
        let blocklist = Blocklist::default_terms();
        assert_eq!(blocklist.len(), DEFAULT_TERMS.len());
        assert!(blocklist.contains("Macbeth"));
        assert!(blocklist.contains("DUNSINANE"));
    }

    #[test]
    fn test_extend_skips_duplicates_and_blanks() {
        let mut blocklist = Blocklist::new(["king"]);
        blocklist.extend(["King", "  ", "ledger"]);
        assert_eq!(blocklist.terms(), ["king", "ledger"]);
    }

    #[test]
    fn test_parse_strips_comments() {
        let blocklist = Blocklist::parse("# heading\nsword # weapon\n\n  castle\n");
        assert_eq!(blocklist.terms(), ["sword", "castle"]);
    }

    #[test]
    fn test_from_file_missing_is_storage_error() {
        let err = Blocklist::from_file("/nonexistent/retell/blocklist.txt").unwrap_err();
        assert!(format!("{}", err).contains("Failed to read file"));
    }

    #[test]
    fn test_serde_as_plain_list() {
        let blocklist: Blocklist = serde_json::from_str(r#"["a", "A", "b"]"#).unwrap();
        assert_eq!(blocklist.terms(), ["a", "b"]);
        assert_eq!(serde_json::to_string(&blocklist).unwrap(), r#"["a","b"]"#);
    }
}
