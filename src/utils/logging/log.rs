//! Load logging for pipeline inputs
//!
//! Every input is announced before it is read and summarized afterwards with
//! a count in its own unit (patients, letters, records).

use std::fmt;
use std::path::Path;
use std::time::Duration;

/// An input read by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// The patient roster file
    Roster,
    /// A walk of the letter tree
    LetterTree,
    /// The cached listing of a letter tree
    ListingCache,
    /// The NLP export
    NlpExport,
}

impl InputSource {
    /// Unit the source is counted in
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Roster => "patients",
            Self::LetterTree | Self::ListingCache => "letters",
            Self::NlpExport => "distinct letter records",
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Roster => "patient roster",
            Self::LetterTree => "letter tree",
            Self::ListingCache => "cached letter listing",
            Self::NlpExport => "NLP export",
        })
    }
}

/// Announce that an input is about to be read
pub fn log_load_start(source: InputSource, path: &Path) {
    log::info!("Reading {source} at {}", path.display());
}

/// Summarize a finished load, e.g. `Read 412 patients from patient roster roster.txt in 3ms`
pub fn log_load_complete(source: InputSource, path: &Path, count: usize, elapsed: Option<Duration>) {
    match elapsed {
        Some(duration) => log::info!(
            "Read {count} {} from {source} {} in {duration:.2?}",
            source.unit(),
            path.display()
        ),
        None => log::info!("Read {count} {} from {source} {}", source.unit(), path.display()),
    }
}

/// Warn about a specific entry of an input
pub fn log_entry_warning(source: InputSource, message: &str, path: &Path) {
    log::warn!("{source}: {message}: {}", path.display());
}
