//! Lookup indices over the letter tree and the NLP export

use rustc_hash::FxHashMap;

use crate::models::patient::PatientId;
use crate::models::record::NlpRecord;

/// Folder name to the filenames observed under it
///
/// Folders and the files within each folder keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryIndex {
    folders: Vec<String>,
    files: FxHashMap<String, Vec<String>>,
}

impl DirectoryIndex {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a folder, with no files yet
    pub fn insert_folder(&mut self, folder: impl Into<String>) {
        let folder = folder.into();
        if !self.files.contains_key(&folder) {
            self.folders.push(folder.clone());
            self.files.insert(folder, Vec::new());
        }
    }

    /// Register a file under its folder
    pub fn insert(&mut self, folder: impl Into<String>, file_name: impl Into<String>) {
        let folder = folder.into();
        self.insert_folder(folder.clone());
        if let Some(files) = self.files.get_mut(&folder) {
            files.push(file_name.into());
        }
    }

    /// Whether a folder with this patient's id was observed
    #[must_use]
    pub fn contains_folder(&self, patient_id: &PatientId) -> bool {
        self.files.contains_key(patient_id.as_str())
    }

    /// Files observed under a folder, empty when the folder is unknown
    #[must_use]
    pub fn files_in(&self, folder: &str) -> &[String] {
        self.files.get(folder).map(Vec::as_slice).unwrap_or_default()
    }

    /// Folder names in insertion order
    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(String::as_str)
    }

    /// All `(folder, file)` pairs in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.folders.iter().flat_map(move |folder| {
            self.files_in(folder)
                .iter()
                .map(move |file| (folder.as_str(), file.as_str()))
        })
    }

    /// Number of folders
    #[must_use]
    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Number of files across all folders
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

impl<F, N> FromIterator<(F, N)> for DirectoryIndex
where
    F: Into<String>,
    N: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (F, N)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (folder, file_name) in iter {
            index.insert(folder, file_name);
        }
        index
    }
}

/// Letter filename to its NLP record
///
/// When several records refer to the same filename the first one is kept.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    records: FxHashMap<String, NlpRecord>,
    duplicates: usize,
}

impl RecordIndex {
    /// Build an index, keeping the first record per filename
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = NlpRecord>,
    {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        if index.duplicates > 0 {
            log::warn!(
                "{} NLP records repeat an earlier filename and were ignored",
                index.duplicates
            );
        }
        index
    }

    /// Insert a record unless its filename is already indexed
    ///
    /// Returns `false` when the record was ignored as a duplicate.
    pub fn insert(&mut self, record: NlpRecord) -> bool {
        if self.records.contains_key(&record.file_name) {
            self.duplicates += 1;
            log::debug!("Ignoring duplicate NLP record for '{}'", record.file_name);
            return false;
        }
        self.records.insert(record.file_name.clone(), record);
        true
    }

    /// Record for a letter filename
    #[must_use]
    pub fn get(&self, file_name: &str) -> Option<&NlpRecord> {
        self.records.get(file_name)
    }

    /// Number of distinct filenames
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records ignored because their filename was already indexed
    #[must_use]
    pub const fn duplicate_count(&self) -> usize {
        self.duplicates
    }
}
