//! Writing generation output to disk.
//!
//! One JSON file per run: 2-space indentation, UTF-8, non-ASCII preserved
//! unescaped. Filenames follow `<input stem>_<content suffix>.json`.

use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::generator::{ContentType, GenerationOutput};

/// Output file path for a run: `<output_dir>/<stem>_<suffix>.json`.
pub fn output_path(output_dir: &Path, input_stem: &str, content_type: ContentType) -> PathBuf {
    output_dir.join(format!("{}_{}.json", input_stem, content_type.output_suffix()))
}

/// Serialize `output` as pretty JSON and write it to `path`.
pub fn write_json(output: &GenerationOutput, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(output)?;
    std::fs::write(path, json)?;

    tracing::info!(
        path = %path.display(),
        records = output.record_count(),
        "Output written"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{QaOutput, QaPair, RephraseRecord};

    #[test]
    fn test_output_path_per_content_type() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            output_path(dir, "report", ContentType::Qa),
            Path::new("/tmp/out/report_qa_pairs.json")
        );
        assert_eq!(
            output_path(dir, "report", ContentType::Distill),
            Path::new("/tmp/out/report_distilled.json")
        );
        assert_eq!(
            output_path(dir, "report", ContentType::KnowledgeList),
            Path::new("/tmp/out/report_knowledge.json")
        );
        assert_eq!(
            output_path(dir, "report", ContentType::ExtractKnowledge),
            Path::new("/tmp/out/report_extracted_knowledge.json")
        );
        assert_eq!(
            output_path(dir, "report", ContentType::WikipediaRephrase),
            Path::new("/tmp/out/report_wikipedia_rephrased.json")
        );
    }

    #[test]
    fn test_write_json_two_space_indent_and_unescaped_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");

        let output = GenerationOutput::Qa(QaOutput {
            qa_pairs: vec![QaPair {
                question: "Qu'est-ce que c'est, ünïcode?".to_string(),
                answer: "日本語".to_string(),
                id: "doc1".to_string(),
            }],
        });

        write_json(&output, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        // 2-space indentation.
        assert!(written.contains("\n  \"qa_pairs\""));
        // Non-ASCII preserved, not \u-escaped.
        assert!(written.contains("日本語"));
        assert!(written.contains("ünïcode"));
        assert!(!written.contains("\\u"));

        // Round-trips.
        let parsed: GenerationOutput = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.record_count(), 1);
    }

    #[test]
    fn test_write_json_array_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        let output = GenerationOutput::WikipediaRephrase(vec![RephraseRecord {
            id: "doc1".to_string(),
            text: "passage".to_string(),
        }]);
        write_json(&output, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.trim_start().starts_with('['));
    }
}
