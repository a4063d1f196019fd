//! Patient-by-term matrix construction
//!
//! Rows follow the roster, columns follow the sorted vocabulary. A cell holds
//! the polarity of that term in the patient's selected letter, or nothing
//! when the term was never observed for the patient.

pub mod vocabulary;

use rustc_hash::FxHashMap;

use crate::algorithm::polarity::Polarity;
use crate::error::{LinkageError, Result};
use crate::models::patient::{PatientClinicalInfo, PatientId, Roster};

pub use vocabulary::Vocabulary;

/// Dense patient × term matrix with undefined cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalMatrix {
    row_ids: Vec<PatientId>,
    columns: Vocabulary,
    cells: Vec<Option<Polarity>>,
}

impl ClinicalMatrix {
    /// Create a matrix with every cell undefined
    #[must_use]
    pub fn undefined(row_ids: Vec<PatientId>, columns: Vocabulary) -> Self {
        let cells = vec![None; row_ids.len() * columns.len()];
        Self {
            row_ids,
            columns,
            cells,
        }
    }

    /// `(rows, columns)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.row_ids.len(), self.columns.len())
    }

    /// Artifact name with the dimensions embedded, e.g. `binFullClinicalTerms10x4c`
    #[must_use]
    pub fn artifact_name(&self) -> String {
        let (rows, cols) = self.shape();
        format!("binFullClinicalTerms{rows}x{cols}c")
    }

    /// Cell value, `None` when undefined or out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<Polarity> {
        let (rows, cols) = self.shape();
        if row >= rows || col >= cols {
            return None;
        }
        self.cells[row * cols + col]
    }

    /// One row of cells, `None` when out of bounds
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[Option<Polarity>]> {
        let cols = self.columns.len();
        if row >= self.row_ids.len() {
            return None;
        }
        self.cells.get(row * cols..(row + 1) * cols)
    }

    /// Row position of a patient
    #[must_use]
    pub fn row_of(&self, patient_id: &PatientId) -> Option<usize> {
        self.row_ids.iter().position(|id| id == patient_id)
    }

    /// Patient identifiers in row order
    #[must_use]
    pub fn row_ids(&self) -> &[PatientId] {
        &self.row_ids
    }

    /// Column vocabulary
    #[must_use]
    pub const fn columns(&self) -> &Vocabulary {
        &self.columns
    }

    /// Values of one column in row order
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = Option<Polarity>> + '_ {
        let cols = self.columns.len();
        (0..self.row_ids.len()).map(move |row| self.cells[row * cols + col])
    }

    /// Number of defined cells
    #[must_use]
    pub fn defined_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    fn set(&mut self, row: usize, col: usize, value: Polarity) {
        let cols = self.columns.len();
        self.cells[row * cols + col] = Some(value);
    }
}

/// Build the matrix for a roster from the linked patients
///
/// Patients absent from `patients` (not found or failed) keep an undefined
/// row. A classified term missing from the vocabulary, or a linked patient
/// missing from the roster, means the inputs were not derived from each
/// other and is reported as an internal consistency error.
pub fn build_matrix(
    roster: &Roster,
    patients: &[PatientClinicalInfo],
    vocabulary: &Vocabulary,
) -> Result<ClinicalMatrix> {
    let mut matrix = ClinicalMatrix::undefined(roster.ids().to_vec(), vocabulary.clone());
    let rows: FxHashMap<&PatientId, usize> = roster
        .iter()
        .enumerate()
        .map(|(row, id)| (id, row))
        .collect();

    for info in patients {
        let row = *rows.get(&info.patient_id).ok_or_else(|| {
            LinkageError::InternalConsistency(format!(
                "Linked patient {} is not in the roster",
                info.patient_id
            ))
        })?;

        // A repeated term would overwrite the earlier classification
        for term in &info.terms {
            let col = vocabulary.index_of(term.term()).ok_or_else(|| {
                LinkageError::InternalConsistency(format!(
                    "Term '{}' of patient {} is missing from the vocabulary",
                    term.term(),
                    info.patient_id
                ))
            })?;
            matrix.set(row, col, term.polarity);
        }
    }

    log::info!(
        "Built {}x{} clinical matrix with {} defined cells",
        matrix.shape().0,
        matrix.shape().1,
        matrix.defined_count()
    );

    Ok(matrix)
}
