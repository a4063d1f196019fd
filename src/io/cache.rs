//! Directory listing cache
//!
//! Walking a large letter tree on a network share is slow, so the listing is
//! stored as a two-column parquet table (`folder`, `file_name`) in the output
//! directory and reused by later runs.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::datatypes::{FieldRef, Schema};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::algorithm::matching::DirectoryIndex;
use crate::error::Result;
use crate::error::util::{safe_create_file, safe_open_file};
use crate::utils::logging::{InputSource, log_load_complete, log_load_start};

/// One cached `(folder, file_name)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ListingRow {
    folder: String,
    file_name: String,
}

/// Parquet cache of a letter tree listing
#[derive(Debug, Clone)]
pub struct DirectoryCache {
    path: PathBuf,
}

impl DirectoryCache {
    /// Cache file for a letter tree root and extension inside `output_dir`
    #[must_use]
    pub fn for_root(output_dir: &Path, letters_dir: &Path, extension: &str) -> Self {
        let root_name = letters_dir
            .file_name()
            .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            path: output_dir.join(format!("dirListing-{root_name}-{extension}.parquet")),
        }
    }

    /// Location of the cache file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a cache file exists
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the cached listing, `None` when no cache exists
    pub fn load(&self) -> Result<Option<DirectoryIndex>> {
        if !self.exists() {
            return Ok(None);
        }
        log_load_start(InputSource::ListingCache, &self.path);

        let file = safe_open_file(&self.path, "directory listing cache")?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut index = DirectoryIndex::new();
        for batch in reader {
            let rows: Vec<ListingRow> = serde_arrow::from_record_batch(&batch?)?;
            for row in rows {
                index.insert(row.folder, row.file_name);
            }
        }

        log_load_complete(InputSource::ListingCache, &self.path, index.file_count(), None);
        Ok(Some(index))
    }

    /// Store a listing, replacing any previous cache
    pub fn store(&self, index: &DirectoryIndex) -> Result<()> {
        let rows: Vec<ListingRow> = index
            .entries()
            .map(|(folder, file_name)| ListingRow {
                folder: folder.to_string(),
                file_name: file_name.to_string(),
            })
            .collect();

        let fields = Vec::<FieldRef>::from_type::<ListingRow>(TracingOptions::default())?;
        let batch = serde_arrow::to_record_batch(&fields, &rows)?;
        let schema = Arc::new(Schema::new(fields));

        let file: File = safe_create_file(&self.path, "directory listing cache")?;
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        log::info!("Cached {} letter paths in {}", rows.len(), self.path.display());
        Ok(())
    }
}
