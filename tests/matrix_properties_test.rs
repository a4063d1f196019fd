//! Properties of the linkage core over in-memory sources

mod utils;

use letter_linker::algorithm::matching::{DirectoryIndex, RecordIndex};
use letter_linker::{
    CohortLinker, NlpRecord, PatientId, Polarity, PolarityClassifier, Roster,
    build_clinical_terms,
};
use utils::chunk;

fn cohort(size: usize) -> (Roster, DirectoryIndex, RecordIndex) {
    let raw_ids = (0..size).map(|i| format!("ID/{i}")).collect::<Vec<_>>();
    let roster = Roster::from_raw(&raw_ids);

    // Every fifth patient has no folder, every third has two letters
    let mut directory = DirectoryIndex::new();
    let mut records = Vec::new();
    for i in (0..size).filter(|i| i % 5 != 0) {
        let folder = format!("ID-{i}");
        directory.insert(folder.clone(), format!("{i}-a.pdf"));
        records.push(NlpRecord::with_chunks(
            format!("{i}-a.pdf"),
            vec![chunk(&format!("term{}", i % 11), &["normal"], &[])],
        ));
        if i % 3 == 0 {
            directory.insert(folder, format!("{i}-b.pdf"));
            records.push(NlpRecord::with_chunks(
                format!("{i}-b.pdf"),
                vec![
                    chunk(&format!("term{}", i % 7), &["moderate"], &[]),
                    chunk("shared", &[], &[]),
                ],
            ));
        }
    }

    (roster, directory, RecordIndex::from_records(records))
}

#[test]
fn test_one_row_per_roster_entry_in_order() {
    let (roster, directory, records) = cohort(50);
    let result =
        build_clinical_terms(&roster, &directory, &records, &CohortLinker::default()).unwrap();

    assert_eq!(result.matrix.shape().0, roster.len());
    for (position, id) in roster.iter().enumerate() {
        assert_eq!(result.matrix.row_of(id), Some(position));
    }
}

#[test]
fn test_not_found_rows_are_undefined() {
    let (roster, directory, records) = cohort(50);
    let result =
        build_clinical_terms(&roster, &directory, &records, &CohortLinker::default()).unwrap();

    assert_eq!(result.linkage.not_found.len(), 10);
    for id in &result.linkage.not_found {
        let row = result.matrix.row_of(id).unwrap();
        assert!(result.matrix.row(row).unwrap().iter().all(Option::is_none));
    }
}

#[test]
fn test_vocabulary_counts_distinct_terms() {
    let (roster, directory, records) = cohort(50);
    let result =
        build_clinical_terms(&roster, &directory, &records, &CohortLinker::default()).unwrap();

    let mut distinct = result
        .linkage
        .patients
        .iter()
        .flat_map(|p| p.term_strings().map(str::to_string))
        .collect::<Vec<_>>();
    distinct.sort();
    distinct.dedup();

    assert_eq!(result.vocabulary().terms(), distinct.as_slice());
}

#[test]
fn test_richer_letter_selected() {
    let (roster, directory, records) = cohort(10);
    let result =
        build_clinical_terms(&roster, &directory, &records, &CohortLinker::default()).unwrap();

    let row = result.matrix.row_of(&PatientId::normalize("ID/3")).unwrap();
    let shared = result.vocabulary().index_of("shared").unwrap();
    let term3 = result.vocabulary().index_of("term3").unwrap();
    assert_eq!(result.matrix.get(row, shared), Some(Polarity::Positive));
    assert_eq!(result.matrix.get(row, term3), Some(Polarity::Positive));
}

#[test]
fn test_rebuild_is_deterministic() {
    let (roster, directory, records) = cohort(400);
    let sequential = CohortLinker::new(PolarityClassifier::default());
    let parallel = CohortLinker::new(PolarityClassifier::default()).with_parallel(true, 3);

    let first = build_clinical_terms(&roster, &directory, &records, &sequential).unwrap();
    let second = build_clinical_terms(&roster, &directory, &records, &sequential).unwrap();
    let third = build_clinical_terms(&roster, &directory, &records, &parallel).unwrap();

    assert_eq!(first.matrix, second.matrix);
    assert_eq!(first.matrix, third.matrix);
    assert_eq!(first.linkage, third.linkage);
}
