//! LLM integration: completion client and batch dispatch.
//!
//! The [`client`] module speaks the OpenAI-compatible `/chat/completions`
//! protocol behind the [`LlmProvider`] trait. The [`batch`] module layers
//! fixed-size, order-preserving, best-effort batch dispatch on top via the
//! [`BatchCompletion`] trait.

pub mod batch;
pub mod client;

pub use batch::{BatchCompletion, BatchDispatcher, DispatchResult};
pub use client::{
    Choice, CompletionClient, GenerationRequest, GenerationResponse, LlmProvider, Message, Usage,
    DEFAULT_MODEL,
};
