//! Fixed-size batch dispatch over a completion backend.
//!
//! The dispatcher partitions an ordered prompt list into fixed-size groups and
//! submits them strictly in sequence. Order is preserved end to end: the Nth
//! response slot always corresponds to the Nth input prompt. A group that
//! fails is logged and its slots are left empty; remaining groups still run.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::error::{GeneratorError, LlmError};
use crate::llm::client::{CompletionClient, Message};
use crate::progress::ProgressCounters;

/// One backend call: a group of message lists completed together.
///
/// Implementations must be order-preserving and return exactly one string per
/// input message list. Any failure fails the whole group.
#[async_trait]
pub trait BatchCompletion: Send + Sync {
    async fn batch_completion(
        &self,
        batches: Vec<Vec<Message>>,
        temperature: f64,
    ) -> Result<Vec<String>, LlmError>;
}

#[async_trait]
impl BatchCompletion for CompletionClient {
    async fn batch_completion(
        &self,
        batches: Vec<Vec<Message>>,
        temperature: f64,
    ) -> Result<Vec<String>, LlmError> {
        let requests = batches
            .into_iter()
            .map(|messages| self.complete(messages, temperature));
        // try_join_all preserves input order in its output.
        try_join_all(requests).await
    }
}

/// Outcome of dispatching a full prompt list.
///
/// Distinguishes a clean run from a best-effort partial one so callers can
/// decide whether to retry or report.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    /// Every prompt produced a response, in input order.
    Complete(Vec<String>),
    /// Some groups failed. `responses` is aligned with the input prompts;
    /// failed prompts hold `None` and their indices are in `failed_indices`.
    Partial {
        responses: Vec<Option<String>>,
        failed_indices: Vec<usize>,
    },
}

impl DispatchResult {
    /// True when no group failed.
    pub fn is_complete(&self) -> bool {
        matches!(self, DispatchResult::Complete(_))
    }

    /// Number of prompts that failed dispatch.
    pub fn failed_count(&self) -> usize {
        match self {
            DispatchResult::Complete(_) => 0,
            DispatchResult::Partial { failed_indices, .. } => failed_indices.len(),
        }
    }

    /// Collapse into per-prompt slots aligned with the input order.
    pub fn into_slots(self) -> Vec<Option<String>> {
        match self {
            DispatchResult::Complete(responses) => responses.into_iter().map(Some).collect(),
            DispatchResult::Partial { responses, .. } => responses,
        }
    }
}

/// Submits prompts to a [`BatchCompletion`] backend in fixed-size groups.
pub struct BatchDispatcher {
    client: Arc<dyn BatchCompletion>,
    batch_size: usize,
    temperature: f64,
}

impl BatchDispatcher {
    /// Create a dispatcher. `batch_size` must be non-zero.
    pub fn new(
        client: Arc<dyn BatchCompletion>,
        batch_size: usize,
        temperature: f64,
    ) -> Result<Self, GeneratorError> {
        if batch_size == 0 {
            return Err(GeneratorError::InvalidParameter(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            client,
            batch_size,
            temperature,
        })
    }

    /// Dispatch all prompts, one group at a time, strictly in sequence.
    ///
    /// Progress counters are advanced after each group completes or fails.
    pub async fn dispatch(
        &self,
        mut prompts: Vec<Vec<Message>>,
        counters: &ProgressCounters,
    ) -> DispatchResult {
        let total = prompts.len();
        let total_batches = total.div_ceil(self.batch_size);

        let mut slots: Vec<Option<String>> = Vec::with_capacity(total);
        let mut failed_indices: Vec<usize> = Vec::new();
        let mut offset = 0usize;

        for batch_num in 1..=total_batches {
            let take = self.batch_size.min(prompts.len());
            let group: Vec<Vec<Message>> = prompts.drain(..take).collect();
            let group_len = group.len();

            match self.client.batch_completion(group, self.temperature).await {
                Ok(responses) if responses.len() == group_len => {
                    slots.extend(responses.into_iter().map(Some));
                    counters.responses.fetch_add(group_len, Ordering::Relaxed);
                    tracing::debug!(
                        batch = batch_num,
                        total_batches,
                        prompts = group_len,
                        "Batch complete"
                    );
                }
                Ok(responses) => {
                    tracing::warn!(
                        batch = batch_num,
                        total_batches,
                        expected = group_len,
                        received = responses.len(),
                        "Backend returned a mismatched response count; dropping batch"
                    );
                    slots.extend(std::iter::repeat_with(|| None).take(group_len));
                    failed_indices.extend(offset..offset + group_len);
                    counters.batches_failed.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::warn!(
                        batch = batch_num,
                        total_batches,
                        prompts = group_len,
                        error = %e,
                        "Batch failed; continuing with remaining batches"
                    );
                    slots.extend(std::iter::repeat_with(|| None).take(group_len));
                    failed_indices.extend(offset..offset + group_len);
                    counters.batches_failed.fetch_add(1, Ordering::Relaxed);
                }
            }

            counters.batches.fetch_add(1, Ordering::Relaxed);
            offset += group_len;
        }

        if failed_indices.is_empty() {
            DispatchResult::Complete(slots.into_iter().flatten().collect())
        } else {
            DispatchResult::Partial {
                responses: slots,
                failed_indices,
            }
        }
    }
}
