//! Global term vocabulary
//!
//! The sorted, deduplicated union of every term observed across the cohort.
//! Its order is the column order of the clinical matrix.

use itertools::Itertools;

/// Sorted list of distinct term strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    /// Deduplicate and sort (lexicographically) all observed terms
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms = terms
            .into_iter()
            .map(Into::<String>::into)
            .sorted_unstable()
            .dedup()
            .collect_vec();
        Self { terms }
    }

    /// Column index of a term (exact string match)
    #[must_use]
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms
            .binary_search_by(|candidate| candidate.as_str().cmp(term))
            .ok()
    }

    /// Terms in column order
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no term was observed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
