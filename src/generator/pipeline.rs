//! The generation pipeline shared by every content type.
//!
//! Workflow: resolve the prompt template, build one prompt per document (per
//! chunk for QA), dispatch the ordered prompt list in fixed-size batches, and
//! assemble the surviving responses into the content type's record shape.
//! Dispatch failures shrink the output; they never abort the run.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::chunk::ChunkSplitter;
use crate::config::SynthConfig;
use crate::error::GeneratorError;
use crate::generator::records::{
    compression_ratio, DistillRecord, DocumentQa, ExtractKnowledgeRecord, GenerationOutput,
    KnowledgeListRecord, QaOutput, QaPair, RephraseRecord,
};
use crate::generator::ContentType;
use crate::llm::{BatchCompletion, BatchDispatcher, Message};
use crate::loader::Document;
use crate::parse::{parse_qa_pairs, strip_rephrase_preface};
use crate::progress::ProgressCounters;
use crate::prompts::PromptTemplate;

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// The assembled output, ready to serialize.
    pub output: GenerationOutput,
    /// Number of input documents.
    pub documents: usize,
    /// Number of prompts dispatched.
    pub prompts: usize,
    /// Number of prompts whose batch failed.
    pub failed_prompts: usize,
    /// Per-document QA pair counts (QA runs only). Every input document has
    /// an entry, including documents that yielded zero pairs.
    pub qa_counts: Option<BTreeMap<String, usize>>,
}

/// Drives a full generation run for one content type.
pub struct GenerationPipeline {
    dispatcher: BatchDispatcher,
    splitter: ChunkSplitter,
    config: SynthConfig,
    counters: ProgressCounters,
}

impl GenerationPipeline {
    /// Build a pipeline from a validated configuration.
    pub fn new(
        client: Arc<dyn BatchCompletion>,
        config: SynthConfig,
    ) -> Result<Self, GeneratorError> {
        let splitter =
            ChunkSplitter::new(config.generation.chunk_size, config.generation.overlap)?;
        let dispatcher = BatchDispatcher::new(
            client,
            config.generation.batch_size,
            config.generation.temperature,
        )?;

        Ok(Self {
            dispatcher,
            splitter,
            config,
            counters: ProgressCounters::new(),
        })
    }

    /// Counters shared with the background progress monitor.
    pub fn counters(&self) -> ProgressCounters {
        self.counters.clone()
    }

    /// Run generation over `documents`.
    ///
    /// `per_document` switches the QA output to the per-document mapping
    /// shape; it is ignored for other content types.
    pub async fn run(
        &self,
        documents: &[Document],
        content_type: ContentType,
        per_document: bool,
    ) -> Result<PipelineReport, GeneratorError> {
        let template = self
            .config
            .prompt(content_type.prompt_name())
            .ok_or_else(|| {
                GeneratorError::PromptNotFound(content_type.prompt_name().to_string())
            })?;

        self.counters
            .documents
            .fetch_add(documents.len(), Ordering::Relaxed);

        // One prompt per unit; doc_index maps each prompt slot back to its
        // source document.
        let mut prompts: Vec<Vec<Message>> = Vec::new();
        let mut doc_index: Vec<usize> = Vec::new();

        match content_type {
            ContentType::Qa => {
                for (i, doc) in documents.iter().enumerate() {
                    let mut chunk_count = 0usize;
                    for chunk in self.splitter.split(&doc.text) {
                        prompts.push(build_messages(&template, &chunk));
                        doc_index.push(i);
                        chunk_count += 1;
                    }
                    self.counters.chunks.fetch_add(chunk_count, Ordering::Relaxed);
                }
            }
            _ => {
                for (i, doc) in documents.iter().enumerate() {
                    prompts.push(build_messages(&template, &doc.text));
                    doc_index.push(i);
                }
            }
        }

        let prompt_count = prompts.len();
        tracing::info!(
            content_type = content_type.label(),
            documents = documents.len(),
            prompts = prompt_count,
            batch_size = self.config.generation.batch_size,
            "Dispatching prompts"
        );

        let result = self.dispatcher.dispatch(prompts, &self.counters).await;
        let failed_prompts = result.failed_count();
        let slots = result.into_slots();

        let (output, qa_counts) = match content_type {
            ContentType::Qa => {
                let (output, counts) =
                    assemble_qa(documents, &doc_index, slots, per_document);
                (output, Some(counts))
            }
            ContentType::Distill => (assemble_distill(documents, slots), None),
            ContentType::KnowledgeList => (assemble_knowledge_list(documents, slots), None),
            ContentType::ExtractKnowledge => {
                (assemble_extract_knowledge(documents, slots), None)
            }
            ContentType::WikipediaRephrase => (assemble_rephrase(documents, slots), None),
        };

        tracing::info!(
            content_type = content_type.label(),
            documents = documents.len(),
            records = output.record_count(),
            failed_prompts,
            "Generation complete"
        );

        Ok(PipelineReport {
            output,
            documents: documents.len(),
            prompts: prompt_count,
            failed_prompts,
            qa_counts,
        })
    }
}

fn build_messages(template: &PromptTemplate, text: &str) -> Vec<Message> {
    vec![
        Message::system(template.system.clone()),
        Message::user(template.render_user(text)),
    ]
}

fn assemble_qa(
    documents: &[Document],
    doc_index: &[usize],
    slots: Vec<Option<String>>,
    per_document: bool,
) -> (GenerationOutput, BTreeMap<String, usize>) {
    // Every document gets an accounting entry, even with zero pairs.
    let mut counts: BTreeMap<String, usize> =
        documents.iter().map(|d| (d.id.clone(), 0)).collect();

    let mut all_pairs: Vec<QaPair> = Vec::new();
    for (slot, &idx) in slots.into_iter().zip(doc_index) {
        let Some(response) = slot else { continue };
        let doc = &documents[idx];

        let mut pairs = parse_qa_pairs(&response);
        for pair in &mut pairs {
            pair.id = doc.id.clone();
        }

        if let Some(count) = counts.get_mut(&doc.id) {
            *count += pairs.len();
        }
        all_pairs.extend(pairs);
    }

    let output = if per_document {
        let mut map: BTreeMap<String, DocumentQa> = documents
            .iter()
            .map(|d| {
                (
                    d.id.clone(),
                    DocumentQa {
                        original_text: d.text.clone(),
                        qa_pairs: Vec::new(),
                    },
                )
            })
            .collect();
        for pair in all_pairs {
            if let Some(entry) = map.get_mut(&pair.id) {
                entry.qa_pairs.push(pair);
            }
        }
        GenerationOutput::QaByDocument(map)
    } else {
        GenerationOutput::Qa(QaOutput { qa_pairs: all_pairs })
    };

    (output, counts)
}

fn assemble_distill(documents: &[Document], slots: Vec<Option<String>>) -> GenerationOutput {
    let records = documents
        .iter()
        .zip(slots)
        .filter_map(|(doc, slot)| {
            slot.map(|text| {
                let original_length = doc.text.chars().count();
                let distilled_length = text.chars().count();
                let ratio = compression_ratio(original_length, distilled_length);
                tracing::debug!(id = %doc.id, chars = distilled_length, ratio, "Distilled document");
                DistillRecord {
                    id: doc.id.clone(),
                    text,
                    original_text: doc.text.clone(),
                    original_length,
                    distilled_length,
                    compression_ratio: ratio,
                }
            })
        })
        .collect();
    GenerationOutput::Distill(records)
}

fn assemble_knowledge_list(
    documents: &[Document],
    slots: Vec<Option<String>>,
) -> GenerationOutput {
    let records = documents
        .iter()
        .zip(slots)
        .filter_map(|(doc, slot)| {
            slot.map(|text| {
                let original_length = doc.text.chars().count();
                let knowledge_length = text.chars().count();
                KnowledgeListRecord {
                    id: doc.id.clone(),
                    text,
                    original_length,
                    knowledge_length,
                    compression_ratio: compression_ratio(original_length, knowledge_length),
                }
            })
        })
        .collect();
    GenerationOutput::KnowledgeList(records)
}

fn assemble_extract_knowledge(
    documents: &[Document],
    slots: Vec<Option<String>>,
) -> GenerationOutput {
    let records = documents
        .iter()
        .zip(slots)
        .filter_map(|(doc, slot)| {
            slot.map(|text| {
                let original_length = doc.text.chars().count();
                let knowledge_length = text.chars().count();
                ExtractKnowledgeRecord {
                    id: doc.id.clone(),
                    text,
                    original_text: doc.text.clone(),
                    original_length,
                    knowledge_length,
                    compression_ratio: compression_ratio(original_length, knowledge_length),
                }
            })
        })
        .collect();
    GenerationOutput::ExtractKnowledge(records)
}

fn assemble_rephrase(documents: &[Document], slots: Vec<Option<String>>) -> GenerationOutput {
    let records = documents
        .iter()
        .zip(slots)
        .filter_map(|(doc, slot)| {
            slot.map(|text| RephraseRecord {
                id: doc.id.clone(),
                text: strip_rephrase_preface(&text).to_string(),
            })
        })
        .collect();
    GenerationOutput::WikipediaRephrase(records)
}
