//! Roster loading
//!
//! The roster is a headerless delimited file whose first column holds one
//! raw patient identifier per line.

use std::io::Read;
use std::path::Path;
use std::time::Instant;

use crate::error::Result;
use crate::error::util::safe_open_file;
use crate::models::patient::Roster;
use crate::utils::logging::{InputSource, log_load_complete, log_load_start};

/// Read raw identifiers from any reader and normalize them into a roster
pub fn parse_roster<R: Read>(reader: R) -> Result<Roster> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut raw_ids = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if let Some(id) = record.get(0) {
            raw_ids.push(id.to_string());
        }
    }

    Ok(Roster::from_raw(raw_ids))
}

/// Load the roster file
pub fn load_roster(path: &Path) -> Result<Roster> {
    let start = Instant::now();
    log_load_start(InputSource::Roster, path);

    let file = safe_open_file(path, "patient roster")?;
    let roster = parse_roster(file)?;

    log_load_complete(InputSource::Roster, path, roster.len(), Some(start.elapsed()));
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::PatientId;

    #[test]
    fn test_parse_roster_normalizes_ids() {
        let input = "AB/123\n CD/456 \n\nEF-789\n";
        let roster = parse_roster(input.as_bytes()).unwrap();
        let ids = roster.iter().map(PatientId::as_str).collect::<Vec<_>>();
        assert_eq!(ids, vec!["AB-123", "CD-456", "EF-789"]);
    }

    #[test]
    fn test_parse_roster_uses_first_column() {
        let roster = parse_roster("A/1,extra\nB/2\n".as_bytes()).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.ids()[0].as_str(), "A-1");
    }
}
