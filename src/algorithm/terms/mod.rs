//! Term taxonomy extraction
//!
//! Turns the chunk list of one NLP record into one [`TermEntry`] per distinct
//! term. Distinct terms are kept in first-seen order; the global column order
//! is fixed later by sorting the vocabulary.

use rustc_hash::FxHashMap;

use crate::error::{LinkageError, Result};
use crate::models::record::{ChunkContainer, DetailedChunk, NlpRecord, TermEntry};

/// Terms extracted from one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTerms {
    /// One entry per distinct term, first-seen order
    pub entries: Vec<TermEntry>,
    /// Number of chunks dropped because they had no usable term
    pub dropped_chunks: usize,
}

impl ExtractedTerms {
    /// Distinct term strings, same order as `entries`
    pub fn unique_terms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.term.as_str())
    }
}

/// Extract the distinct terms of a record and aggregate their descriptors
///
/// A record without a results container yields no terms. A container whose
/// shape could not be resolved is an error for this record only.
pub fn extract_terms(record: &NlpRecord) -> Result<ExtractedTerms> {
    match &record.chunks {
        ChunkContainer::Absent => Ok(ExtractedTerms::default()),
        ChunkContainer::Malformed(reason) => Err(LinkageError::malformed_record(
            record.file_name.clone(),
            reason.clone(),
        )),
        ChunkContainer::Chunks(raw) => {
            let mut dropped_chunks = 0;
            let chunks = raw.iter().filter_map(|value| {
                let chunk = DetailedChunk::from_value(value);
                if chunk.is_none() {
                    dropped_chunks += 1;
                }
                chunk
            });
            let entries = aggregate_chunks(chunks);

            if dropped_chunks > 0 {
                log::warn!(
                    "Dropped {} chunks without a term in record '{}'",
                    dropped_chunks,
                    record.file_name
                );
            }

            Ok(ExtractedTerms {
                entries,
                dropped_chunks,
            })
        }
    }
}

/// Merge chunks sharing a term into a single entry per term
pub fn aggregate_chunks<I>(chunks: I) -> Vec<TermEntry>
where
    I: IntoIterator<Item = DetailedChunk>,
{
    let mut positions: FxHashMap<String, usize> = FxHashMap::default();
    let mut entries: Vec<TermEntry> = Vec::new();

    for chunk in chunks {
        let idx = *positions.entry(chunk.term.clone()).or_insert_with(|| {
            entries.push(TermEntry::new(chunk.term.clone()));
            entries.len() - 1
        });
        entries[idx].absorb(chunk);
    }

    entries
}
