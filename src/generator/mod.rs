//! Content generation: one parameterized pipeline for all five content types.
//!
//! Each content type is a strategy descriptor (prompt name x response parser
//! x output shape) over the same skeleton: split (QA only) -> build prompts ->
//! dispatch in batches -> parse -> assemble records.

pub mod pipeline;
pub mod records;

pub use pipeline::{GenerationPipeline, PipelineReport};
pub use records::{
    compression_ratio, DistillRecord, DocumentQa, ExtractKnowledgeRecord, GenerationOutput,
    KnowledgeListRecord, QaOutput, QaPair, RephraseRecord,
};

/// The five supported content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ContentType {
    /// Question-answer pairs extracted per chunk.
    Qa,
    /// Concise distilled passage per document.
    Distill,
    /// Information-dense fact list per document.
    KnowledgeList,
    /// Knowledge extracted and rewritten as clear passages.
    ExtractKnowledge,
    /// Wikipedia-style rephrasing per document.
    WikipediaRephrase,
}

impl ContentType {
    /// Name of the prompt template this content type uses.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            ContentType::Qa => "qa_generation",
            ContentType::Distill => "distill",
            ContentType::KnowledgeList => "knowledge_list",
            ContentType::ExtractKnowledge => "extract_knowledge",
            ContentType::WikipediaRephrase => "wikipedia_rephrase",
        }
    }

    /// Suffix appended to the input file stem for the output filename.
    pub fn output_suffix(&self) -> &'static str {
        match self {
            ContentType::Qa => "qa_pairs",
            ContentType::Distill => "distilled",
            ContentType::KnowledgeList => "knowledge",
            ContentType::ExtractKnowledge => "extracted_knowledge",
            ContentType::WikipediaRephrase => "wikipedia_rephrased",
        }
    }

    /// Human-readable label used in logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Qa => "qa",
            ContentType::Distill => "distill",
            ContentType::KnowledgeList => "knowledge-list",
            ContentType::ExtractKnowledge => "extract-knowledge",
            ContentType::WikipediaRephrase => "wikipedia-rephrase",
        }
    }
}
