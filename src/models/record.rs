//! NLP record models
//!
//! One [`NlpRecord`] is one line of the NLP export and describes one letter.
//! Chunks are kept as raw JSON values until extraction so that a malformed
//! chunk only loses its own contribution.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{LinkageError, Result};

/// Location of the chunk container inside the `Results` array
const RESULTS_FIELD: &str = "Results";
const RESPONSE_APIS_FIELD: &str = "ChunkingResponseApis";
const CHUNKING_RESULT_FIELD: &str = "ChunkingResult";
const CHUNK_LIST_FIELD: &str = "DetailedChunkList";

/// State of a record's chunk container
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkContainer {
    /// `Results` was null or missing: the letter was processed but yielded nothing
    Absent,
    /// The detailed chunk list, unparsed
    Chunks(Vec<Value>),
    /// `Results` existed but did not lead to a chunk list
    Malformed(String),
}

impl ChunkContainer {
    /// Number of chunk entries, zero unless the container holds chunks
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Chunks(chunks) => chunks.len(),
            Self::Absent | Self::Malformed(_) => 0,
        }
    }

    /// Whether the container holds no chunks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the container could not be resolved to a chunk list
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Resolve the chunk container from a record's `Results` value
    fn from_results(results: Option<&Value>) -> Self {
        let results = match results {
            None | Some(Value::Null) => return Self::Absent,
            Some(value) => value,
        };

        let chunk_list = results
            .get(0)
            .and_then(|r| r.get(RESPONSE_APIS_FIELD))
            .and_then(|apis| apis.get(0))
            .and_then(|api| api.get(CHUNKING_RESULT_FIELD))
            .and_then(|res| res.get(CHUNK_LIST_FIELD));

        match chunk_list {
            Some(Value::Array(chunks)) => Self::Chunks(chunks.clone()),
            Some(other) => Self::Malformed(format!(
                "{CHUNK_LIST_FIELD} is {} instead of an array",
                json_kind(other)
            )),
            None => Self::Malformed(format!(
                "{RESULTS_FIELD}[0].{RESPONSE_APIS_FIELD}[0].{CHUNKING_RESULT_FIELD}.{CHUNK_LIST_FIELD} not found"
            )),
        }
    }
}

/// One parsed unit of the NLP export
#[derive(Debug, Clone, PartialEq)]
pub struct NlpRecord {
    /// Filename of the letter this record was extracted from
    pub file_name: String,
    /// Extracted chunks
    pub chunks: ChunkContainer,
}

impl NlpRecord {
    /// Create a record holding the given raw chunks
    #[must_use]
    pub fn with_chunks(file_name: impl Into<String>, chunks: Vec<Value>) -> Self {
        Self {
            file_name: file_name.into(),
            chunks: ChunkContainer::Chunks(chunks),
        }
    }

    /// Create a record whose results container is null
    #[must_use]
    pub fn empty(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            chunks: ChunkContainer::Absent,
        }
    }

    /// Parse a record from one line of the export
    pub fn from_json_line(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line)?;
        Self::from_json_value(&value)
    }

    /// Parse a record from an already decoded JSON value
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let file_name = match value.get("ExternalMessageId") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(LinkageError::malformed_record(
                    "<unknown>",
                    "ExternalMessageId missing or not a string",
                ));
            }
        };

        Ok(Self {
            chunks: ChunkContainer::from_results(value.get(RESULTS_FIELD)),
            file_name,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Deserialize)]
struct ChildConceptWire {
    #[serde(rename = "Term")]
    term: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImChildWire {
    #[serde(rename = "KeyText")]
    key_text: Option<String>,
}

/// One mention of a clinical term within a letter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailedChunk {
    /// Canonical term string
    pub term: String,
    /// Key string of the mention
    pub key: Option<String>,
    /// Terms of directly attached child concepts
    pub child_concepts: Vec<String>,
    /// Key texts of nested children
    pub nested_children: Vec<String>,
}

impl DetailedChunk {
    /// Parse a chunk leniently
    ///
    /// Returns `None` when the chunk has no string `Term`. Any other missing
    /// or mistyped field contributes nothing.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let term = value.get("Term")?.as_str()?.to_string();
        let key = value.get("Key").and_then(Value::as_str).map(str::to_string);

        let child_concepts = list_field::<ChildConceptWire>(value, "ChildConcepts")
            .filter_map(|c| c.term)
            .collect();
        let nested_children = list_field::<ImChildWire>(value, "IMChildren")
            .filter_map(|c| c.key_text)
            .collect();

        Some(Self {
            term,
            key,
            child_concepts,
            nested_children,
        })
    }
}

/// Iterate the entries of an array field that deserialize as `T`, skipping the rest
fn list_field<'a, T>(value: &'a Value, field: &str) -> impl Iterator<Item = T> + 'a
where
    T: serde::de::DeserializeOwned + 'a,
{
    value
        .get(field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| T::deserialize(entry).ok())
}

/// All mentions of one term within a record, merged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermEntry {
    /// The unique term string
    pub term: String,
    /// Key strings of every mention
    pub keys: Vec<String>,
    /// Child concept terms of every mention
    pub child_concepts: Vec<String>,
    /// Nested child key texts of every mention
    pub nested_children: Vec<String>,
}

impl TermEntry {
    /// Create an entry with no descriptors
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    /// Merge one more mention of the same term
    pub fn absorb(&mut self, chunk: DetailedChunk) {
        debug_assert_eq!(self.term, chunk.term);
        self.keys.extend(chunk.key);
        self.child_concepts.extend(chunk.child_concepts);
        self.nested_children.extend(chunk.nested_children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_with_chunks() {
        let line = json!({
            "ExternalMessageId": "letter1.pdf",
            "Results": [{
                "ChunkingResponseApis": [{
                    "ChunkingResult": {
                        "DetailedChunkList": [
                            {"Term": "tremor", "Key": "k1", "ChildConcepts": [], "IMChildren": []},
                            {"Term": "sleep", "Key": "k2", "ChildConcepts": [], "IMChildren": []}
                        ]
                    }
                }]
            }]
        })
        .to_string();

        let record = NlpRecord::from_json_line(&line).unwrap();
        assert_eq!(record.file_name, "letter1.pdf");
        assert_eq!(record.chunks.len(), 2);
    }

    #[test]
    fn test_null_results_is_absent() {
        let record =
            NlpRecord::from_json_line(r#"{"ExternalMessageId": "a.pdf", "Results": null}"#).unwrap();
        assert_eq!(record.chunks, ChunkContainer::Absent);
        assert!(record.chunks.is_empty());
    }

    #[test]
    fn test_numeric_message_id() {
        let record = NlpRecord::from_json_line(r#"{"ExternalMessageId": 1234}"#).unwrap();
        assert_eq!(record.file_name, "1234");
    }

    #[test]
    fn test_unexpected_results_shape_is_malformed() {
        let record =
            NlpRecord::from_json_line(r#"{"ExternalMessageId": "a.pdf", "Results": [{}]}"#).unwrap();
        assert!(matches!(record.chunks, ChunkContainer::Malformed(_)));
        assert_eq!(record.chunks.len(), 0);
    }

    #[test]
    fn test_missing_message_id_is_error() {
        assert!(NlpRecord::from_json_line(r#"{"Results": null}"#).is_err());
    }

    #[test]
    fn test_chunk_parsing_is_lenient() {
        let chunk = DetailedChunk::from_value(&json!({
            "Term": "tremor",
            "ChildConcepts": [{"Term": "left"}, {"Other": 1}, "junk", {"Term": 5}],
            "IMChildren": "not a list"
        }))
        .unwrap();

        assert_eq!(chunk.key, None);
        assert_eq!(chunk.child_concepts, vec!["left".to_string()]);
        assert!(chunk.nested_children.is_empty());

        assert!(DetailedChunk::from_value(&json!({"Key": "k"})).is_none());
        assert!(DetailedChunk::from_value(&json!({"Term": 3})).is_none());
    }
}
