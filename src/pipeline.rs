//! End-to-end linkage pipeline
//!
//! Loads the three sources, links the cohort, builds the vocabulary and the
//! matrix, and writes the artifacts. Patients that cannot be matched are
//! reported but never stop the run; outputs are produced regardless.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::algorithm::linkage::{CohortLinkage, CohortLinker};
use crate::algorithm::matching::{DirectoryIndex, RecordIndex};
use crate::algorithm::matrix::{ClinicalMatrix, Vocabulary, build_matrix};
use crate::algorithm::polarity::PolarityClassifier;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::error::util::ensure_directory;
use crate::io::{self, DirectoryCache};
use crate::models::patient::Roster;

/// File receiving identifiers without a folder in the letter tree
pub const NOT_FOUND_FILE: &str = "pdfCasesNotFound.csv";
/// File receiving identifiers whose record could not be processed
pub const FAILED_FILE: &str = "pdfCasesFailed.csv";
/// File receiving the run summary
pub const SUMMARY_FILE: &str = "linkageSummary.json";

/// Counts describing one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkageSummary {
    /// When the summary was produced
    pub generated_at: DateTime<Utc>,
    /// Patients in the roster
    pub roster_size: usize,
    /// Patients whose folder was located
    pub located: usize,
    /// Located patients with a matched letter
    pub with_letter: usize,
    /// Located patients without a matched letter
    pub letterless: usize,
    /// Patients without a folder
    pub not_found: usize,
    /// Patients whose record failed to process
    pub failed: usize,
    /// Distinct terms across the cohort
    pub vocabulary_size: usize,
    /// Matrix rows
    pub matrix_rows: usize,
    /// Matrix columns
    pub matrix_cols: usize,
    /// Cells holding a polarity
    pub defined_cells: usize,
}

impl LinkageSummary {
    /// Summarize a linkage and the matrix built from it
    #[must_use]
    pub fn new(roster: &Roster, linkage: &CohortLinkage, matrix: &ClinicalMatrix) -> Self {
        let (matrix_rows, matrix_cols) = matrix.shape();
        Self {
            generated_at: Utc::now(),
            roster_size: roster.len(),
            located: linkage.patients.len(),
            with_letter: linkage.matched_count(),
            letterless: linkage.letterless_count(),
            not_found: linkage.not_found.len(),
            failed: linkage.failed.len(),
            vocabulary_size: matrix.columns().len(),
            matrix_rows,
            matrix_cols,
            defined_cells: matrix.defined_count(),
        }
    }
}

/// Everything a run derived from its inputs
#[derive(Debug, Clone)]
pub struct ClinicalTermsResult {
    /// Per-patient linkage
    pub linkage: CohortLinkage,
    /// The patient × term matrix
    pub matrix: ClinicalMatrix,
}

impl ClinicalTermsResult {
    /// Column vocabulary of the matrix
    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        self.matrix.columns()
    }
}

/// Paths of the artifacts written by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    /// Not-found identifier list
    pub not_found: PathBuf,
    /// Failed identifier list
    pub failed: PathBuf,
    /// Matrix parquet file
    pub matrix: PathBuf,
    /// Run summary
    pub summary: PathBuf,
}

/// Outcome of [`run`]
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Derived structures
    pub result: ClinicalTermsResult,
    /// Summary counts
    pub summary: LinkageSummary,
    /// Written files
    pub artifacts: RunArtifacts,
}

/// Link the cohort and build the matrix from already loaded sources
///
/// The vocabulary is deduplicated and sorted once, after the whole cohort
/// has been linked.
pub fn build_clinical_terms(
    roster: &Roster,
    directory: &DirectoryIndex,
    records: &RecordIndex,
    linker: &CohortLinker,
) -> Result<ClinicalTermsResult> {
    let linkage = linker.link_cohort(roster, directory, records)?;
    let vocabulary = Vocabulary::from_terms(linkage.term_sources.iter().cloned());
    info!("Vocabulary holds {} distinct terms", vocabulary.len());

    let matrix = build_matrix(roster, &linkage.patients, &vocabulary)?;
    Ok(ClinicalTermsResult { linkage, matrix })
}

/// Load the directory index, from the cache when allowed and available
pub fn load_directory_index(config: &PipelineConfig) -> Result<DirectoryIndex> {
    let cache = DirectoryCache::for_root(
        &config.output_dir,
        &config.letters_dir,
        &config.letter_extension,
    );

    if config.use_cache {
        if let Some(index) = cache.load()? {
            return Ok(index);
        }
    }

    let index = io::list_directory_tree(&config.letters_dir, &config.letter_extension)?;
    if config.use_cache {
        cache.store(&index)?;
    }
    Ok(index)
}

/// Run the complete pipeline for a configuration
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let start = Instant::now();
    let total_steps = 5;
    config.validate()?;
    ensure_directory(&config.output_dir, "pipeline outputs")?;
    info!("{config}");

    info!("[Step 1/{total_steps}] Loading patient roster");
    let roster = io::load_roster(&config.roster_path)?;

    info!("[Step 2/{total_steps}] Indexing letter tree");
    let directory = load_directory_index(config)?;

    info!("[Step 3/{total_steps}] Loading NLP records");
    let records = io::load_all_records(&config.records_path)?;

    info!("[Step 4/{total_steps}] Linking cohort and building matrix");
    let linker = CohortLinker::new(PolarityClassifier::default())
        .with_parallel(config.use_parallel, config.num_threads);
    let result = build_clinical_terms(&roster, &directory, &records, &linker)?;

    info!("[Step 5/{total_steps}] Writing outputs");
    info!("Number of cases not found: {}", result.linkage.not_found.len());

    let artifacts = RunArtifacts {
        not_found: config.output_dir.join(NOT_FOUND_FILE),
        failed: config.output_dir.join(FAILED_FILE),
        matrix: io::write_matrix(&config.output_dir, &result.matrix)?,
        summary: config.output_dir.join(SUMMARY_FILE),
    };
    io::write_id_list(&artifacts.not_found, &result.linkage.not_found)?;
    io::write_id_list(
        &artifacts.failed,
        result.linkage.failed.iter().map(|f| &f.patient_id),
    )?;

    let summary = LinkageSummary::new(&roster, &result.linkage, &result.matrix);
    io::write_summary(&artifacts.summary, &summary)?;

    info!("Pipeline finished in {:.2?}", start.elapsed());
    Ok(PipelineOutput {
        result,
        summary,
        artifacts,
    })
}
