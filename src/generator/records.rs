//! Output record shapes for each content type.
//!
//! Field names match the JSON the tool emits; consumers feed these files
//! straight into fine-tuning pipelines, so the shapes are load-bearing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A question/answer pair extracted from model output. `id` back-references
/// the source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
    pub id: String,
}

/// Default QA output: a flat list of pairs across all documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaOutput {
    pub qa_pairs: Vec<QaPair>,
}

/// Per-document QA entry for the `--per-document` output variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentQa {
    pub original_text: String,
    pub qa_pairs: Vec<QaPair>,
}

/// One distilled document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistillRecord {
    pub id: String,
    pub text: String,
    pub original_text: String,
    pub original_length: usize,
    pub distilled_length: usize,
    pub compression_ratio: f64,
}

/// One knowledge list. Deliberately omits the original text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeListRecord {
    pub id: String,
    pub text: String,
    pub original_length: usize,
    pub knowledge_length: usize,
    pub compression_ratio: f64,
}

/// One extracted-and-rewritten knowledge passage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractKnowledgeRecord {
    pub id: String,
    pub text: String,
    pub original_text: String,
    pub original_length: usize,
    pub knowledge_length: usize,
    pub compression_ratio: f64,
}

/// One Wikipedia-style rephrasing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RephraseRecord {
    pub id: String,
    pub text: String,
}

/// The full output of a generation run, serialized as the run's JSON file.
///
/// Untagged: each variant serializes as its bare shape (an object for QA
/// variants, an array for the rest), matching the per-content-type files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GenerationOutput {
    Qa(QaOutput),
    QaByDocument(BTreeMap<String, DocumentQa>),
    Distill(Vec<DistillRecord>),
    KnowledgeList(Vec<KnowledgeListRecord>),
    ExtractKnowledge(Vec<ExtractKnowledgeRecord>),
    WikipediaRephrase(Vec<RephraseRecord>),
}

impl GenerationOutput {
    /// Number of records in the output (pairs for QA variants).
    pub fn record_count(&self) -> usize {
        match self {
            GenerationOutput::Qa(out) => out.qa_pairs.len(),
            GenerationOutput::QaByDocument(map) => {
                map.values().map(|doc| doc.qa_pairs.len()).sum()
            }
            GenerationOutput::Distill(records) => records.len(),
            GenerationOutput::KnowledgeList(records) => records.len(),
            GenerationOutput::ExtractKnowledge(records) => records.len(),
            GenerationOutput::WikipediaRephrase(records) => records.len(),
        }
    }
}

/// Output length divided by input length, both in characters.
///
/// Guarded: an empty input yields 0.0 rather than dividing by zero.
pub fn compression_ratio(input_chars: usize, output_chars: usize) -> f64 {
    if input_chars == 0 {
        return 0.0;
    }
    output_chars as f64 / input_chars as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_ratio_exact() {
        // 10-char input, 5-char output.
        assert_eq!(compression_ratio("abcdefghij".chars().count(), 5), 0.5);
    }

    #[test]
    fn test_compression_ratio_zero_input_guarded() {
        assert_eq!(compression_ratio(0, 5), 0.0);
        assert_eq!(compression_ratio(0, 0), 0.0);
    }

    #[test]
    fn test_qa_output_serializes_as_object_with_qa_pairs() {
        let output = GenerationOutput::Qa(QaOutput {
            qa_pairs: vec![QaPair {
                question: "Q?".to_string(),
                answer: "A.".to_string(),
                id: "doc1".to_string(),
            }],
        });
        let json = serde_json::to_value(&output).unwrap();
        assert!(json.is_object());
        assert_eq!(json["qa_pairs"][0]["id"], "doc1");
    }

    #[test]
    fn test_record_list_serializes_as_array() {
        let output = GenerationOutput::WikipediaRephrase(vec![RephraseRecord {
            id: "doc1".to_string(),
            text: "rephrased".to_string(),
        }]);
        let json = serde_json::to_value(&output).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["text"], "rephrased");
    }

    #[test]
    fn test_record_count() {
        let mut map = BTreeMap::new();
        map.insert(
            "doc1".to_string(),
            DocumentQa {
                original_text: "t".to_string(),
                qa_pairs: vec![
                    QaPair {
                        question: "q1".to_string(),
                        answer: "a1".to_string(),
                        id: "doc1".to_string(),
                    },
                    QaPair {
                        question: "q2".to_string(),
                        answer: "a2".to_string(),
                        id: "doc1".to_string(),
                    },
                ],
            },
        );
        map.insert(
            "doc2".to_string(),
            DocumentQa {
                original_text: "t".to_string(),
                qa_pairs: vec![],
            },
        );
        assert_eq!(GenerationOutput::QaByDocument(map).record_count(), 2);
    }
}
