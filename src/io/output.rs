//! Run artifacts
//!
//! * identifier lists (`pdfCasesNotFound.csv`, `pdfCasesFailed.csv`): one
//!   quoted value per line, no header
//! * the clinical matrix as parquet: a `patient_id` column followed by one
//!   nullable Int8 column per vocabulary term
//! * a JSON summary of the run

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Int8Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Serialize;

use crate::algorithm::matrix::ClinicalMatrix;
use crate::error::{LinkageError, Result};
use crate::error::util::safe_create_file;

/// Name of the row identifier column in the matrix artifact
pub const PATIENT_ID_COLUMN: &str = "patient_id";

/// Write a single-column list of identifiers, every value quoted, no header
pub fn write_id_list<I, S>(path: &Path, ids: I) -> Result<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let file = safe_create_file(path, "identifier list")?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(file);

    let mut written = 0;
    for id in ids {
        writer.write_record([id.as_ref()])?;
        written += 1;
    }
    writer.flush()?;

    log::info!("Wrote {written} identifiers to {}", path.display());
    Ok(written)
}

/// Convert the matrix into a single Arrow record batch
pub fn matrix_to_record_batch(matrix: &ClinicalMatrix) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(matrix.columns().len() + 1);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(matrix.columns().len() + 1);

    fields.push(Field::new(PATIENT_ID_COLUMN, DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from_iter_values(
        matrix.row_ids().iter().map(|id| id.as_str()),
    )));

    for (col, term) in matrix.columns().terms().iter().enumerate() {
        if term == PATIENT_ID_COLUMN {
            return Err(LinkageError::InternalConsistency(format!(
                "Term '{term}' collides with the row identifier column"
            )));
        }
        fields.push(Field::new(term, DataType::Int8, true));
        let values: Int8Array = matrix
            .column_values(col)
            .map(|cell| cell.map(|p| p.as_u8() as i8))
            .collect();
        columns.push(Arc::new(values));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Write the matrix to `{dir}/{artifact_name}.parquet` and return the path
pub fn write_matrix(dir: &Path, matrix: &ClinicalMatrix) -> Result<PathBuf> {
    let path = dir.join(format!("{}.parquet", matrix.artifact_name()));
    let batch = matrix_to_record_batch(matrix)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let file = safe_create_file(&path, "clinical matrix")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    let (rows, cols) = matrix.shape();
    log::info!("Saved {rows}x{cols} clinical matrix to {}", path.display());
    Ok(path)
}

/// Write any serializable summary as pretty JSON
pub fn write_summary<T: Serialize>(path: &Path, summary: &T) -> Result<()> {
    let file = safe_create_file(path, "run summary")?;
    serde_json::to_writer_pretty(file, summary)?;
    log::info!("Wrote run summary to {}", path.display());
    Ok(())
}
