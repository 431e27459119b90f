//! Parsers for free-text LLM responses.
//!
//! The QA prompt asks for `- Question: ... Answer: ...` lines, but the model
//! output is natural language, not a contract. The parser here is therefore
//! tolerant by construction: it extracts whatever well-formed pairs it can
//! find and silently drops malformed or partial entries. It never errors.

use std::sync::OnceLock;

use regex::Regex;

use crate::generator::records::QaPair;

/// Marker kind found in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Question,
    Answer,
}

/// Matches `Question:` / `Answer:` markers, tolerating case variation,
/// numbering ("Question 3:") and surrounding markdown.
fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(question|answer)\b\s*\d*\s*:").expect("marker regex is valid")
    })
}

/// Strip bullet and markdown residue left around an extracted fragment.
fn clean_fragment(fragment: &str) -> String {
    fragment
        .trim()
        .trim_start_matches(['*', '-', '•'])
        .trim_end_matches(['*', '-', '•'])
        .trim()
        .to_string()
}

/// Extract ordered question/answer pairs from one LLM response.
///
/// Each question is paired with the next answer that follows it. A question
/// with no following answer (including a trailing one), an answer with no
/// preceding question, and stray prose between markers are all dropped
/// silently. Returns an empty vector when nothing parses.
///
/// The `id` field of every returned pair is left empty; the caller stamps the
/// source document id.
pub fn parse_qa_pairs(response: &str) -> Vec<QaPair> {
    let markers: Vec<(usize, usize, Marker)> = marker_re()
        .find_iter(response)
        .map(|m| {
            let kind = if m.as_str().trim_start().to_ascii_lowercase().starts_with('q') {
                Marker::Question
            } else {
                Marker::Answer
            };
            (m.start(), m.end(), kind)
        })
        .collect();

    let mut pairs = Vec::new();
    let mut pending_question: Option<String> = None;

    for (i, &(_, end, kind)) in markers.iter().enumerate() {
        let segment_end = markers
            .get(i + 1)
            .map(|&(next_start, _, _)| next_start)
            .unwrap_or(response.len());
        let fragment = clean_fragment(&response[end..segment_end]);

        match kind {
            Marker::Question => {
                // A second question before any answer drops the first one.
                pending_question = (!fragment.is_empty()).then_some(fragment);
            }
            Marker::Answer => {
                if let Some(question) = pending_question.take() {
                    if !fragment.is_empty() {
                        pairs.push(QaPair {
                            question,
                            answer: fragment,
                            id: String::new(),
                        });
                    }
                }
            }
        }
    }

    pairs
}

/// Preface the rephrase prompt tends to elicit despite instructions.
pub const REPHRASE_PREFACE: &str = "Here is a paraphrased version:";

/// Remove the optional rephrase preface, when present.
///
/// Pass-through transform: responses without the preface come back trimmed
/// but otherwise untouched.
pub fn strip_rephrase_preface(response: &str) -> &str {
    let trimmed = response.trim();
    if let Some(head) = trimmed.get(..REPHRASE_PREFACE.len()) {
        if head.eq_ignore_ascii_case(REPHRASE_PREFACE) {
            return trimmed[REPHRASE_PREFACE.len()..].trim_start();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_pairs_parse_in_order() {
        let response = "Here are the questions and answers based on the provided text:\n\
                        - Question: What is synthetic data? Answer: Synthetic data is artificially generated data.\n\
                        - Question: Why use it? Answer: To protect privacy.";
        let pairs = parse_qa_pairs(response);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].question, "What is synthetic data?");
        assert_eq!(
            pairs[0].answer,
            "Synthetic data is artificially generated data."
        );
        assert_eq!(pairs[1].question, "Why use it?");
        assert_eq!(pairs[1].answer, "To protect privacy.");
    }

    #[test]
    fn test_pairs_on_separate_lines() {
        let response = "Question: What color is the sky?\nAnswer: Blue.\n\n\
                        Question: How many legs does a spider have?\nAnswer: Eight.";
        let pairs = parse_qa_pairs(response);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].question, "What color is the sky?");
        assert_eq!(pairs[0].answer, "Blue.");
        assert_eq!(pairs[1].answer, "Eight.");
    }

    #[test]
    fn test_trailing_unmatched_question_is_dropped() {
        let response = "Question: First? Answer: One.\n\
                        Question: Second? Answer: Two.\n\
                        Question: Third with no answer?";
        let pairs = parse_qa_pairs(response);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].question, "Second?");
    }

    #[test]
    fn test_answer_without_question_is_dropped() {
        let response = "Answer: Orphaned.\nQuestion: Real? Answer: Yes.";
        let pairs = parse_qa_pairs(response);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question, "Real?");
        assert_eq!(pairs[0].answer, "Yes.");
    }

    #[test]
    fn test_consecutive_questions_keep_only_the_latest() {
        let response = "Question: Dropped? Question: Kept? Answer: This one.";
        let pairs = parse_qa_pairs(response);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question, "Kept?");
    }

    #[test]
    fn test_unparseable_response_yields_empty() {
        assert!(parse_qa_pairs("No structured content here at all.").is_empty());
        assert!(parse_qa_pairs("").is_empty());
    }

    #[test]
    fn test_markdown_and_numbered_markers() {
        let response = "**Question 1:** What is Rust? **Answer 1:** A systems language.\n\
                        **Question 2:** Is it fast? **Answer 2:** Yes.";
        let pairs = parse_qa_pairs(response);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].question, "What is Rust?");
        assert_eq!(pairs[0].answer, "A systems language.");
        assert_eq!(pairs[1].question, "Is it fast?");
    }

    #[test]
    fn test_case_insensitive_markers() {
        let response = "question: lower? answer: yes.";
        let pairs = parse_qa_pairs(response);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question, "lower?");
    }

    #[test]
    fn test_parsed_pairs_have_empty_id() {
        let pairs = parse_qa_pairs("Question: Q? Answer: A.");
        assert_eq!(pairs[0].id, "");
    }

    #[test]
    fn test_strip_rephrase_preface() {
        assert_eq!(
            strip_rephrase_preface("Here is a paraphrased version: The cat sat."),
            "The cat sat."
        );
        assert_eq!(
            strip_rephrase_preface("here is a paraphrased version:\nThe cat sat."),
            "The cat sat."
        );
    }

    #[test]
    fn test_strip_rephrase_preface_absent() {
        assert_eq!(
            strip_rephrase_preface("  The cat sat on the mat.  "),
            "The cat sat on the mat."
        );
        assert_eq!(strip_rephrase_preface(""), "");
        // Shorter than the preface itself.
        assert_eq!(strip_rephrase_preface("Here"), "Here");
    }
}
