//! Patient entity models
//!
//! A [`PatientId`] is the join key shared by the roster, the letter tree and
//! the NLP export. [`PatientClinicalInfo`] is what linkage produces for each
//! patient whose folder was located.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::algorithm::polarity::{Polarity, PolarityRule};
use crate::models::record::TermEntry;

/// Normalized patient identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    /// Normalize a raw roster identifier: trim and replace `/` with `-`
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().replace('/', "-"))
    }

    /// Wrap an identifier that is already normalized (e.g. a folder name)
    #[must_use]
    pub fn from_normalized(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty after normalization
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered list of unique patient identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    ids: Vec<PatientId>,
}

impl Roster {
    /// Build a roster from raw identifiers
    ///
    /// Identifiers are normalized, blanks are skipped and repeated ids keep
    /// only their first position.
    pub fn from_raw<I, S>(raw_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = raw_ids
            .into_iter()
            .map(|raw| PatientId::normalize(raw.as_ref()))
            .filter(|id| !id.is_empty())
            .collect_vec();

        let total = normalized.len();
        let ids = normalized.into_iter().unique().collect_vec();
        if ids.len() < total {
            log::warn!(
                "Roster contains {} repeated identifiers; keeping first occurrences",
                total - ids.len()
            );
        }

        Self { ids }
    }

    /// Identifiers in roster order
    #[must_use]
    pub fn ids(&self) -> &[PatientId] {
        &self.ids
    }

    /// Number of patients
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the roster is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over identifiers in roster order
    pub fn iter(&self) -> std::slice::Iter<'_, PatientId> {
        self.ids.iter()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a PatientId;
    type IntoIter = std::slice::Iter<'a, PatientId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

/// A term extracted from a patient's letter together with its polarity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTerm {
    /// Aggregated term entry
    pub entry: TermEntry,
    /// Positive or negative finding
    pub polarity: Polarity,
    /// Rule that decided the polarity (`None` when no rule fired)
    pub decided_by: Option<PolarityRule>,
}

impl ClassifiedTerm {
    /// The term string
    #[must_use]
    pub fn term(&self) -> &str {
        &self.entry.term
    }
}

/// Linkage result for one patient whose folder was located
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientClinicalInfo {
    /// Patient identifier
    pub patient_id: PatientId,
    /// Filename of the selected letter, empty if none matched
    pub file_name: String,
    /// Terms of the selected letter in extraction order
    pub terms: Vec<ClassifiedTerm>,
}

impl PatientClinicalInfo {
    /// A located patient without any matched letter
    #[must_use]
    pub const fn letterless(patient_id: PatientId) -> Self {
        Self {
            patient_id,
            file_name: String::new(),
            terms: Vec::new(),
        }
    }

    /// Whether a letter was matched for this patient
    #[must_use]
    pub fn has_letter(&self) -> bool {
        !self.file_name.is_empty()
    }

    /// Unique term strings of the selected letter
    pub fn term_strings(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(ClassifiedTerm::term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_replaces_slashes() {
        assert_eq!(PatientId::normalize(" AB/123/4 ").as_str(), "AB-123-4");
        assert_eq!(PatientId::normalize("XY-9").as_str(), "XY-9");
    }

    #[test]
    fn test_roster_skips_blanks_and_repeats() {
        let roster = Roster::from_raw(["A/1", "", "B/2", "A-1", "  ", "C/3"]);
        let ids = roster.iter().map(PatientId::as_str).collect_vec();
        assert_eq!(ids, vec!["A-1", "B-2", "C-3"]);
    }

    #[test]
    fn test_letterless_patient() {
        let info = PatientClinicalInfo::letterless(PatientId::normalize("A/1"));
        assert!(!info.has_letter());
        assert_eq!(info.term_strings().count(), 0);
    }
}
