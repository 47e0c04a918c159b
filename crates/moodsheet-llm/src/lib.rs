//! LLM-backed sentiment classification.
//!
//! [`SentimentClassifier`] turns the content cells of one row into a prompt,
//! sends it through an [`LlmBackend`] and validates the answer, retrying up
//! to the configured bound.

mod classifier;
mod client;

pub use classifier::SentimentClassifier;
pub use client::{
    FailingLlmBackend, LlmBackend, MockLlmBackend, OpenAiCompatibleBackend, ScriptedLlmBackend,
};

use anyhow::Result;
use moodsheet_config::MoodsheetConfig;

/// Production classifier: OpenAI-compatible backend with thread sleeps.
pub fn classifier_from_config(
    config: &MoodsheetConfig,
) -> Result<SentimentClassifier<OpenAiCompatibleBackend>> {
    let backend = OpenAiCompatibleBackend::new(&config.llm)?;
    Ok(SentimentClassifier::from_config(backend, config))
}
