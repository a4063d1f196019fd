//! Record-linkage and term-normalization algorithms
//!
//! Leaf-first:
//!
//! 1. [`terms`]: distinct terms of one NLP record with aggregated descriptors
//! 2. [`polarity`]: rule-based positive/negative classification of a term
//! 3. [`matching`]: best NLP record for a patient's folder
//! 4. [`linkage`]: the per-patient pass over the whole roster
//! 5. [`matrix`]: vocabulary and the patient × term matrix

pub mod linkage;
pub mod matching;
pub mod matrix;
pub mod polarity;
pub mod terms;

pub use linkage::{CohortLinkage, CohortLinker, FailedPatient, PatientOutcome};
pub use matching::{DirectoryIndex, RecordIndex, RecordMatcher, RecordSelection};
pub use matrix::{ClinicalMatrix, Vocabulary, build_matrix};
pub use polarity::{Polarity, PolarityClassifier, PolarityRule};
pub use terms::{ExtractedTerms, extract_terms};
