//! A Rust library for linking a patient roster, a tree of clinic letters and
//! an NLP term export into a patient-by-term binary matrix.
//!
//! The roster, the letter folders and the NLP records are joined on the
//! patient identifier and the letter filename. The richest letter per
//! patient is kept, its terms are deduplicated and classified as positive or
//! negative findings, and the cohort is laid out as a dense matrix with one
//! row per roster entry and one column per distinct term.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod utils;

// Core types
pub use config::PipelineConfig;
pub use error::{LinkageError, Result};

// Domain models
pub use models::{NlpRecord, PatientClinicalInfo, PatientId, Roster, TermEntry};

// Algorithms
pub use algorithm::{
    ClinicalMatrix, CohortLinkage, CohortLinker, DirectoryIndex, Polarity, PolarityClassifier,
    RecordIndex, RecordMatcher, Vocabulary, build_matrix, extract_terms,
};

// Pipeline
pub use pipeline::{LinkageSummary, PipelineOutput, build_clinical_terms, run};
