//! Shared fixtures for integration tests
//!
//! Builds a small cohort on disk: a roster file, a letter tree with one
//! folder per patient and a JSON-lines NLP export.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use letter_linker::PipelineConfig;
use serde_json::{Value, json};
use tempfile::TempDir;

/// A chunk as the NLP export writes it
#[must_use]
pub fn chunk(term: &str, concepts: &[&str], nested: &[&str]) -> Value {
    json!({
        "Term": term,
        "Key": format!("key-{term}"),
        "ChildConcepts": concepts.iter().map(|c| json!({"Term": c})).collect::<Vec<_>>(),
        "IMChildren": nested.iter().map(|n| json!({"KeyText": n})).collect::<Vec<_>>(),
    })
}

/// One line of the NLP export with the given chunks
#[must_use]
pub fn record_line(file_name: &str, chunks: &[Value]) -> String {
    json!({
        "ExternalMessageId": file_name,
        "Results": [{
            "ChunkingResponseApis": [{
                "ChunkingResult": {"DetailedChunkList": chunks}
            }]
        }]
    })
    .to_string()
}

/// One line of the NLP export whose results container is null
#[must_use]
pub fn empty_record_line(file_name: &str) -> String {
    json!({"ExternalMessageId": file_name, "Results": null}).to_string()
}

/// A cohort laid out in a temporary directory
pub struct FixtureCohort {
    dir: TempDir,
}

impl FixtureCohort {
    /// Create an empty fixture directory
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(dir.path().join("letters")).expect("create letter tree");
        Self { dir }
    }

    /// Root of the fixture
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Letter tree root
    #[must_use]
    pub fn letters_dir(&self) -> PathBuf {
        self.root().join("letters")
    }

    /// Output directory
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.root().join("out")
    }

    /// Write the roster file
    pub fn write_roster(&self, raw_ids: &[&str]) {
        let mut content = raw_ids.join("\n");
        content.push('\n');
        fs::write(self.root().join("roster.txt"), content).expect("write roster");
    }

    /// Place an (empty) letter in a patient's folder
    pub fn add_letter(&self, folder: &str, file_name: &str) {
        let folder = self.letters_dir().join(folder);
        fs::create_dir_all(&folder).expect("create patient folder");
        fs::write(folder.join(file_name), b"%PDF-1.4").expect("write letter");
    }

    /// Write the NLP export
    pub fn write_records(&self, lines: &[String]) {
        fs::write(self.root().join("records.json"), lines.join("\n")).expect("write records");
    }

    /// Configuration pointing at this fixture
    #[must_use]
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig::builder()
            .roster_path(self.root().join("roster.txt"))
            .letters_dir(self.letters_dir())
            .records_path(self.root().join("records.json"))
            .output_dir(self.output_dir())
            .use_parallel(false)
            .build()
    }
}

/// The standard cohort used by the pipeline tests
///
/// * `AB/1`: two letters, the second one richer
/// * `AB/2`: no folder at all
/// * `AB/3`: folder with a letter the export does not know
/// * `AB/4`: letter whose record has a null results container
/// * `AB/5`: letter with a malformed chunk list
#[must_use]
pub fn standard_cohort() -> FixtureCohort {
    let cohort = FixtureCohort::new();
    cohort.write_roster(&["AB/1", "AB/2", "AB/3", "AB/4", "AB/5"]);

    cohort.add_letter("AB-1", "ab1_2019.pdf");
    cohort.add_letter("AB-1", "ab1_2020.pdf");
    cohort.add_letter("AB-3", "ab3.pdf");
    cohort.add_letter("AB-4", "ab4.pdf");
    cohort.add_letter("AB-5", "ab5.pdf");

    cohort.write_records(&[
        record_line("ab1_2019.pdf", &[chunk("tremor", &[], &[])]),
        record_line(
            "ab1_2020.pdf",
            &[
                chunk("tremor", &["left"], &[]),
                chunk("tremor", &[], &[]),
                chunk("sleep disturbance", &["not present"], &[]),
                chunk("anxiety", &[], &["reported by carer"]),
            ],
        ),
        empty_record_line("ab4.pdf"),
        json!({
            "ExternalMessageId": "ab5.pdf",
            "Results": [{"ChunkingResponseApis": [{"ChunkingResult": {"DetailedChunkList": "oops"}}]}]
        })
        .to_string(),
        record_line("unrelated.pdf", &[chunk("constipation", &[], &[])]),
    ]);

    cohort
}
