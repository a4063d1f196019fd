//! Letter tree listing
//!
//! Walks the letter repository and indexes every letter under the name of
//! the folder that directly contains it. The walk is sorted by name so the
//! candidate order seen by the matcher is reproducible.

use std::path::Path;
use std::time::Instant;

use walkdir::WalkDir;

use crate::algorithm::matching::DirectoryIndex;
use crate::error::util::validate_directory;
use crate::error::{LinkageError, Result};
use crate::utils::logging::{
    InputSource, log_entry_warning, log_load_complete, log_load_start, progress,
};

/// Build the folder → letters index for a letter tree
///
/// Only files whose extension equals `extension` (case-insensitive) are
/// indexed. Folders without any such file are not recorded.
pub fn list_directory_tree(root: &Path, extension: &str) -> Result<DirectoryIndex> {
    let start = Instant::now();
    log_load_start(InputSource::LetterTree, root);
    validate_directory(root, "letter tree")?;

    let spinner = progress::create_spinner(Some("letters indexed"));
    let mut index = DirectoryIndex::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            match e.into_io_error() {
                Some(io) => LinkageError::io(path, "Failed to walk letter tree", io),
                None => LinkageError::Config(format!(
                    "Filesystem loop detected under {}",
                    path.display()
                )),
            }
        })?;

        if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
            continue;
        }

        let folder = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned());
        let Some(folder) = folder else {
            log_entry_warning(InputSource::LetterTree, "letter without a parent folder name", entry.path());
            continue;
        };

        index.insert(folder, entry.file_name().to_string_lossy().into_owned());
        spinner.inc(1);
    }

    progress::finish_and_clear(&spinner);

    if index.file_count() == 0 {
        log_entry_warning(InputSource::LetterTree, "no letters found under root", root);
    } else {
        log::info!("Indexed {} letters in {} folders", index.file_count(), index.folder_count());
    }
    log_load_complete(InputSource::LetterTree, root, index.file_count(), Some(start.elapsed()));

    Ok(index)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_indexes_letters_by_parent_folder() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("batch1").join("P-2");
        fs::create_dir_all(root.path().join("P-1")).unwrap();
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(root.path().join("P-3")).unwrap();

        fs::write(root.path().join("P-1").join("b.pdf"), b"").unwrap();
        fs::write(root.path().join("P-1").join("a.PDF"), b"").unwrap();
        fs::write(root.path().join("P-1").join("notes.txt"), b"").unwrap();
        fs::write(nested.join("c.pdf"), b"").unwrap();
        fs::write(root.path().join("P-3").join("scan.tiff"), b"").unwrap();

        let index = list_directory_tree(root.path(), "pdf").unwrap();
        assert_eq!(index.files_in("P-1"), ["a.PDF", "b.pdf"]);
        assert_eq!(index.files_in("P-2"), ["c.pdf"]);
        assert_eq!(index.folder_count(), 2);
        assert!(index.files_in("P-3").is_empty());
    }

    #[test]
    fn test_missing_root_is_error() {
        assert!(list_directory_tree(Path::new("/no/such/letters"), "pdf").is_err());
    }
}
