//! Domain models for the linkage pipeline
//!
//! Patients and the roster on one side, NLP records and their term taxonomy
//! on the other.

pub mod patient;
pub mod record;

pub use patient::{ClassifiedTerm, PatientClinicalInfo, PatientId, Roster};
pub use record::{ChunkContainer, DetailedChunk, NlpRecord, TermEntry};
