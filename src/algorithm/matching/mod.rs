//! Letter-to-record matching
//!
//! Links a patient's folder in the letter tree to the NLP records of the
//! letters inside it and picks the most informative one.
//!
//! 1. [`DirectoryIndex`]: folder name to the letters observed under it
//! 2. [`RecordIndex`]: letter filename to its NLP record
//! 3. [`RecordMatcher`]: richness scoring and best-candidate selection

pub mod index;
pub mod matcher;

pub use index::{DirectoryIndex, RecordIndex};
pub use matcher::{RecordMatcher, RecordSelection};
