//! Prompt templates for each content type.
//!
//! Every template is a system/user pair with a `{text}` substitution point in
//! the user half. The built-ins below cover the five content types; any of
//! them can be overridden per-name in the `prompts` section of the config
//! file.

use serde::{Deserialize, Serialize};

/// A system/user prompt pair. The user template contains a `{text}`
/// placeholder that is replaced with the document (or chunk) text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptTemplate {
    pub system: String,
    pub user: String,
}

impl PromptTemplate {
    /// Render the user template for the given input text.
    pub fn render_user(&self, text: &str) -> String {
        self.user.replace("{text}", text)
    }
}

const QA_GENERATION_SYSTEM: &str = "You are a helpful assistant that creates question and answer pairs \
for training language models. Base every question strictly on the provided text.";

const QA_GENERATION_USER: &str = r#"Create question-answer pairs from the following text.
Format each pair on its own line exactly as:
- Question: <question> Answer: <answer>

Do not add commentary before or after the pairs.

Text:
{text}"#;

const DISTILL_SYSTEM: &str =
    "You condense documents into shorter passages that preserve every important fact.";

const DISTILL_USER: &str = r#"Distill the following text into a concise passage. Keep all key facts,
names, and numbers. Return only the distilled text.

Text:
{text}"#;

const KNOWLEDGE_LIST_SYSTEM: &str =
    "You extract key facts and knowledge from documents as information-dense lists.";

const KNOWLEDGE_LIST_USER: &str = r#"Extract the key facts from the following text as a list, one fact
per line. Each fact must be self-contained. Return only the list.

Text:
{text}"#;

const EXTRACT_KNOWLEDGE_SYSTEM: &str =
    "You extract the knowledge contained in documents and rewrite it as clear prose.";

const EXTRACT_KNOWLEDGE_USER: &str = r#"Extract the knowledge contained in the following text and rewrite
it as clear, self-contained passages. Return only the rewritten passages.

Text:
{text}"#;

const WIKIPEDIA_REPHRASE_SYSTEM: &str =
    "You rephrase text in the style of a Wikipedia article: encyclopedic, neutral, third person.";

const WIKIPEDIA_REPHRASE_USER: &str = r#"Rephrase the following text as a Wikipedia-style passage.
Return only the rephrased text.

Text:
{text}"#;

/// Built-in template for a prompt name, if one exists.
pub fn default_prompt(name: &str) -> Option<PromptTemplate> {
    let (system, user) = match name {
        "qa_generation" => (QA_GENERATION_SYSTEM, QA_GENERATION_USER),
        "distill" => (DISTILL_SYSTEM, DISTILL_USER),
        "knowledge_list" => (KNOWLEDGE_LIST_SYSTEM, KNOWLEDGE_LIST_USER),
        "extract_knowledge" => (EXTRACT_KNOWLEDGE_SYSTEM, EXTRACT_KNOWLEDGE_USER),
        "wikipedia_rephrase" => (WIKIPEDIA_REPHRASE_SYSTEM, WIKIPEDIA_REPHRASE_USER),
        _ => return None,
    };
    Some(PromptTemplate {
        system: system.to_string(),
        user: user.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_content_type_prompts_exist() {
        for name in [
            "qa_generation",
            "distill",
            "knowledge_list",
            "extract_knowledge",
            "wikipedia_rephrase",
        ] {
            let prompt = default_prompt(name).unwrap_or_else(|| panic!("missing prompt {name}"));
            assert!(!prompt.system.is_empty());
            assert!(
                prompt.user.contains("{text}"),
                "user template for {name} must contain a {{text}} placeholder"
            );
        }
    }

    #[test]
    fn test_unknown_prompt_name() {
        assert!(default_prompt("summarize_backwards").is_none());
    }

    #[test]
    fn test_render_user_substitutes_text() {
        let prompt = default_prompt("distill").unwrap();
        let rendered = prompt.render_user("the quick brown fox");
        assert!(rendered.contains("the quick brown fox"));
        assert!(!rendered.contains("{text}"));
    }
}
