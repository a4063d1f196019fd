//! Cohort linkage
//!
//! Drives identifier → folder → record → terms → polarity for every patient
//! of the roster. Each patient is linked by a pure function returning a
//! [`PatientOutcome`]; outcomes are collected in roster order and reduced
//! once into a [`CohortLinkage`], so the parallel and sequential passes give
//! identical results.

use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;

use crate::algorithm::matching::{DirectoryIndex, RecordIndex, RecordMatcher};
use crate::algorithm::polarity::PolarityClassifier;
use crate::algorithm::terms::extract_terms;
use crate::error::{LinkageError, Result};
use crate::models::patient::{ClassifiedTerm, PatientClinicalInfo, PatientId, Roster};
use crate::utils::logging::progress;

/// A patient whose selected record could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPatient {
    /// Patient identifier
    pub patient_id: PatientId,
    /// Why processing failed
    pub reason: String,
}

/// Linkage result for a single patient
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientOutcome {
    /// Folder located; the letter may or may not have been matched
    Linked(PatientClinicalInfo),
    /// No folder for this identifier in the letter tree
    NotFound(PatientId),
    /// Folder and record located but the record could not be processed
    Failed(FailedPatient),
}

/// Linkage result for the whole cohort
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortLinkage {
    /// Located patients in roster order
    pub patients: Vec<PatientClinicalInfo>,
    /// Identifiers without a folder, in roster order
    pub not_found: Vec<PatientId>,
    /// Patients whose record failed to process, in roster order
    pub failed: Vec<FailedPatient>,
    /// Each located patient's unique terms, concatenated in roster order (not deduplicated)
    pub term_sources: Vec<String>,
}

impl CohortLinkage {
    /// Fold per-patient outcomes, in roster order, into the cohort result
    #[must_use]
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = PatientOutcome>,
    {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut linkage, outcome| {
                match outcome {
                    PatientOutcome::Linked(info) => {
                        linkage
                            .term_sources
                            .extend(info.term_strings().map(str::to_string));
                        linkage.patients.push(info);
                    }
                    PatientOutcome::NotFound(id) => linkage.not_found.push(id),
                    PatientOutcome::Failed(failed) => linkage.failed.push(failed),
                }
                linkage
            })
    }

    /// Located patients for whom a letter was matched
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.patients.iter().filter(|p| p.has_letter()).count()
    }

    /// Located patients without any matched letter
    #[must_use]
    pub fn letterless_count(&self) -> usize {
        self.patients.len() - self.matched_count()
    }
}

/// Links every patient of a roster to their best letter and its terms
#[derive(Debug, Clone)]
pub struct CohortLinker {
    classifier: PolarityClassifier,
    use_parallel: bool,
    num_threads: usize,
}

impl Default for CohortLinker {
    fn default() -> Self {
        Self::new(PolarityClassifier::default())
    }
}

impl CohortLinker {
    /// Cohorts smaller than this are linked sequentially
    const PARALLEL_THRESHOLD: usize = 256;

    /// Create a sequential linker using the given classifier
    #[must_use]
    pub const fn new(classifier: PolarityClassifier) -> Self {
        Self {
            classifier,
            use_parallel: false,
            num_threads: 1,
        }
    }

    /// Enable parallel linking with the given number of threads
    #[must_use]
    pub const fn with_parallel(mut self, use_parallel: bool, num_threads: usize) -> Self {
        self.use_parallel = use_parallel;
        self.num_threads = num_threads;
        self
    }

    /// Link a single patient
    ///
    /// Pure with respect to its inputs: the outcome depends only on the
    /// identifier and the two indices.
    #[must_use]
    pub fn link_patient(
        &self,
        patient_id: &PatientId,
        directory: &DirectoryIndex,
        records: &RecordIndex,
    ) -> PatientOutcome {
        let matcher = RecordMatcher::new(directory, records);

        if !matcher.folder_exists(patient_id) {
            warn!("Patient id not found in letter tree: {patient_id}");
            return PatientOutcome::NotFound(patient_id.clone());
        }

        let selection = matcher.select_best_record(patient_id);
        let Some(record) = selection.record else {
            return PatientOutcome::Linked(PatientClinicalInfo::letterless(patient_id.clone()));
        };

        match extract_terms(record) {
            Ok(extracted) => {
                let terms = extracted
                    .entries
                    .into_iter()
                    .map(|entry| {
                        let (polarity, decided_by) = self
                            .classifier
                            .classify_detailed(&entry.child_concepts, &entry.nested_children);
                        ClassifiedTerm {
                            entry,
                            polarity,
                            decided_by,
                        }
                    })
                    .collect();

                PatientOutcome::Linked(PatientClinicalInfo {
                    patient_id: patient_id.clone(),
                    file_name: selection.file_name,
                    terms,
                })
            }
            Err(e) => {
                warn!("Skipping terms for patient {patient_id}: {e}");
                PatientOutcome::Failed(FailedPatient {
                    patient_id: patient_id.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Link every patient of the roster
    pub fn link_cohort(
        &self,
        roster: &Roster,
        directory: &DirectoryIndex,
        records: &RecordIndex,
    ) -> Result<CohortLinkage> {
        let start = Instant::now();
        let use_parallel = self.use_parallel && roster.len() >= Self::PARALLEL_THRESHOLD;
        let pb = progress::create_main_progress_bar(roster.len() as u64, Some("Linking patients"));

        let outcomes: Vec<PatientOutcome> = if use_parallel {
            info!("Linking {} patients using {} threads", roster.len(), self.num_threads);
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.num_threads)
                .build()
                .map_err(|e| LinkageError::Config(format!("Failed to build thread pool: {e}")))?;

            pool.install(|| {
                roster
                    .ids()
                    .par_iter()
                    .map(|id| {
                        let outcome = self.link_patient(id, directory, records);
                        pb.inc(1);
                        outcome
                    })
                    .collect()
            })
        } else {
            info!("Linking {} patients sequentially", roster.len());
            roster
                .iter()
                .map(|id| {
                    let outcome = self.link_patient(id, directory, records);
                    pb.inc(1);
                    outcome
                })
                .collect()
        };

        progress::finish_progress_bar(&pb, Some("Linking complete"));

        let linkage = CohortLinkage::from_outcomes(outcomes);
        info!(
            "Linked {} patients ({} with a letter, {} letterless), {} not found, {} failed in {:.2?}",
            linkage.patients.len(),
            linkage.matched_count(),
            linkage.letterless_count(),
            linkage.not_found.len(),
            linkage.failed.len(),
            start.elapsed()
        );

        Ok(linkage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::polarity::Polarity;
    use crate::models::record::{ChunkContainer, NlpRecord};
    use serde_json::json;

    fn fixture() -> (Roster, DirectoryIndex, RecordIndex) {
        let roster = Roster::from_raw(["P/1", "P/2", "P/3", "P/4", "P/5"]);
        let directory: DirectoryIndex = [
            ("P-1", "p1a.pdf"),
            ("P-1", "p1b.pdf"),
            ("P-3", "p3.pdf"),
            ("P-4", "p4.pdf"),
            ("P-5", "p5.pdf"),
        ]
        .into_iter()
        .collect();

        let records = RecordIndex::from_records([
            NlpRecord::with_chunks("p1a.pdf", vec![json!({"Term": "tremor"})]),
            NlpRecord::with_chunks(
                "p1b.pdf",
                vec![
                    json!({"Term": "tremor", "ChildConcepts": [{"Term": "left"}]}),
                    json!({"Term": "sleep", "ChildConcepts": [{"Term": "normal"}]}),
                ],
            ),
            NlpRecord::empty("p4.pdf"),
            NlpRecord {
                file_name: "p5.pdf".to_string(),
                chunks: ChunkContainer::Malformed("broken".to_string()),
            },
        ]);

        (roster, directory, records)
    }

    #[test]
    fn test_link_cohort_outcomes() {
        let (roster, directory, records) = fixture();
        let linkage = CohortLinker::default()
            .link_cohort(&roster, &directory, &records)
            .unwrap();

        let ids = linkage
            .patients
            .iter()
            .map(|p| p.patient_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["P-1", "P-3", "P-4"]);
        assert_eq!(linkage.not_found, vec![PatientId::from_normalized("P-2")]);
        assert_eq!(linkage.failed.len(), 1);
        assert_eq!(linkage.failed[0].patient_id.as_str(), "P-5");

        let p1 = &linkage.patients[0];
        assert_eq!(p1.file_name, "p1b.pdf");
        let polarities = p1
            .terms
            .iter()
            .map(|t| (t.term(), t.polarity))
            .collect::<Vec<_>>();
        assert_eq!(
            polarities,
            vec![("tremor", Polarity::Positive), ("sleep", Polarity::Negative)]
        );

        // Folder without any NLP record
        assert!(!linkage.patients[1].has_letter());
        // Record with a null results container is matched but empty
        assert_eq!(linkage.patients[2].file_name, "p4.pdf");
        assert!(linkage.patients[2].terms.is_empty());

        assert_eq!(linkage.term_sources, vec!["tremor", "sleep"]);
        assert_eq!(linkage.matched_count(), 2);
        assert_eq!(linkage.letterless_count(), 1);
    }

    #[test]
    fn test_malformed_letter_does_not_hide_valid_one() {
        let directory: DirectoryIndex = [("P-1", "a.pdf"), ("P-1", "b.pdf")].into_iter().collect();
        let records = RecordIndex::from_records([
            NlpRecord {
                file_name: "a.pdf".to_string(),
                chunks: ChunkContainer::Malformed("x".to_string()),
            },
            NlpRecord::empty("b.pdf"),
        ]);

        let outcome = CohortLinker::default().link_patient(
            &PatientId::from_normalized("P-1"),
            &directory,
            &records,
        );
        let info = match outcome {
            PatientOutcome::Linked(info) => info,
            other => panic!("expected a linked patient, got {other:?}"),
        };
        assert_eq!(info.file_name, "b.pdf");
        assert!(info.terms.is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let raw_ids = (0..600).map(|i| format!("P/{i}")).collect::<Vec<_>>();
        let roster = Roster::from_raw(&raw_ids);
        let directory: DirectoryIndex = (0..600)
            .filter(|i| i % 7 != 0)
            .map(|i| (format!("P-{i}"), format!("{i}.pdf")))
            .collect();
        let records = RecordIndex::from_records((0..600).map(|i| {
            NlpRecord::with_chunks(
                format!("{i}.pdf"),
                vec![json!({"Term": format!("term{}", i % 13)})],
            )
        }));

        let sequential = CohortLinker::default()
            .link_cohort(&roster, &directory, &records)
            .unwrap();
        let parallel = CohortLinker::default()
            .with_parallel(true, 4)
            .link_cohort(&roster, &directory, &records)
            .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(parallel.not_found.len(), 86);
    }
}
