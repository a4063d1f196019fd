//! NLP export loading
//!
//! The export holds one JSON record per line. A line that cannot be parsed
//! is reported and skipped; it never stops the run.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::algorithm::matching::RecordIndex;
use crate::error::Result;
use crate::error::util::safe_open_file;
use crate::models::record::NlpRecord;
use crate::utils::logging::{InputSource, log_load_complete, log_load_start};

/// Parse JSON-lines records from a reader into a filename index
///
/// `source` only labels log messages.
pub fn parse_records<R: BufRead>(reader: R, source: &str) -> Result<RecordIndex> {
    let mut index = RecordIndex::default();
    let mut parsed = 0usize;
    let mut skipped = 0usize;

    for (line_no, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                skipped += 1;
                log::warn!("{source}:{}: skipping NLP record that is not UTF-8: {e}", line_no + 1);
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match NlpRecord::from_json_line(trimmed) {
            Ok(record) => {
                parsed += 1;
                index.insert(record);
            }
            Err(e) => {
                skipped += 1;
                log::warn!("{source}:{}: skipping unreadable NLP record: {e}", line_no + 1);
            }
        }
    }

    if index.duplicate_count() > 0 {
        log::warn!(
            "{source}: {} records repeat an earlier filename; the first occurrence is used",
            index.duplicate_count()
        );
    }
    log::info!(
        "{source}: parsed {parsed} records ({} distinct letters), skipped {skipped} lines",
        index.len()
    );

    Ok(index)
}

/// Load every record of the NLP export
pub fn load_all_records(path: &Path) -> Result<RecordIndex> {
    let start = Instant::now();
    log_load_start(InputSource::NlpExport, path);

    let file = safe_open_file(path, "NLP record export")?;
    let index = parse_records(BufReader::new(file), &path.display().to_string())?;

    log_load_complete(InputSource::NlpExport, path, index.len(), Some(start.elapsed()));
    Ok(index)
}
