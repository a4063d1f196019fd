//! Best-record selection for a patient
//!
//! Each letter in the patient's folder is a candidate. A candidate's score is
//! its richness: the number of chunks its NLP record holds. The richest
//! candidate wins and ties go to the candidate seen first in the folder
//! listing. A record whose chunk container is malformed only wins when no
//! other candidate resolves. Letters with no record in the export are never
//! selected.

use crate::algorithm::matching::index::{DirectoryIndex, RecordIndex};
use crate::models::patient::PatientId;
use crate::models::record::NlpRecord;

/// Outcome of record selection for one patient
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSelection<'a> {
    /// Selected record, `None` when no letter in the folder had a record
    pub record: Option<&'a NlpRecord>,
    /// Filename of the selected letter, empty when none was selected
    pub file_name: String,
    /// Richness of the selected record
    pub richness: usize,
    /// Number of letters observed in the folder
    pub candidates: usize,
    /// Letters in the folder without a record in the export
    pub unresolved: usize,
}

impl RecordSelection<'_> {
    fn none(candidates: usize, unresolved: usize) -> Self {
        Self {
            record: None,
            file_name: String::new(),
            richness: 0,
            candidates,
            unresolved,
        }
    }

    /// Whether a record was selected
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        self.record.is_some()
    }
}

/// Selects the most informative NLP record for a patient
#[derive(Debug, Clone, Copy)]
pub struct RecordMatcher<'a> {
    directory: &'a DirectoryIndex,
    records: &'a RecordIndex,
}

impl<'a> RecordMatcher<'a> {
    /// Create a matcher over the two lookup indices
    #[must_use]
    pub const fn new(directory: &'a DirectoryIndex, records: &'a RecordIndex) -> Self {
        Self { directory, records }
    }

    /// Richness of a record: its chunk count, or zero without a chunk list
    #[must_use]
    pub fn richness(record: &NlpRecord) -> usize {
        record.chunks.len()
    }

    /// Selection score: well-formed records first, then richness
    fn score(record: &NlpRecord) -> (bool, usize) {
        (!record.chunks.is_malformed(), Self::richness(record))
    }

    /// Whether the patient's folder was observed in the letter tree
    #[must_use]
    pub fn folder_exists(&self, patient_id: &PatientId) -> bool {
        self.directory.contains_folder(patient_id)
    }

    /// Select the richest record among the letters in the patient's folder
    ///
    /// Ties are broken in favour of the first letter in folder order. An
    /// unknown folder behaves like an empty one; callers distinguish the two
    /// with [`Self::folder_exists`].
    #[must_use]
    pub fn select_best_record(&self, patient_id: &PatientId) -> RecordSelection<'a> {
        let files = self.directory.files_in(patient_id.as_str());
        let mut unresolved = 0;
        let mut best: Option<(&'a str, &'a NlpRecord, (bool, usize))> = None;

        for file_name in files {
            let Some(record) = self.records.get(file_name) else {
                unresolved += 1;
                log::debug!("{patient_id}: letter '{file_name}' has no NLP record");
                continue;
            };

            let score = Self::score(record);
            log::debug!("{patient_id}: candidate '{file_name}' scores {score:?}");

            if best.is_none_or(|(_, _, best_score)| score > best_score) {
                best = Some((file_name.as_str(), record, score));
            }
        }

        match best {
            Some((file_name, record, (_, richness))) => RecordSelection {
                record: Some(record),
                file_name: file_name.to_string(),
                richness,
                candidates: files.len(),
                unresolved,
            },
            None => RecordSelection::none(files.len(), unresolved),
        }
    }
}
