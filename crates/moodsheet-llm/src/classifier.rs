use crate::client::LlmBackend;
use moodsheet_config::{MoodsheetConfig, PromptConfig};
use moodsheet_parse::{ParseFailure, parse_sentiment};
use moodsheet_ports::Classifier;
use moodsheet_prompt::build_prompt;
use moodsheet_retry::{Retry, RetryPolicy, Sleeper, ThreadSleeper};
use moodsheet_schema::{ClassificationResult, FailureKind, Sentiment};
use std::fmt;

/// Why one attempt did not produce a label.
#[derive(Debug)]
enum AttemptError {
    Provider(anyhow::Error),
    Malformed(ParseFailure),
}

impl AttemptError {
    fn kind(&self) -> FailureKind {
        match self {
            AttemptError::Provider(_) => FailureKind::Provider,
            AttemptError::Malformed(f) => f.kind(),
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Provider(e) => write!(f, "LLM API call failed: {e:#}"),
            AttemptError::Malformed(p) => write!(f, "{p}"),
        }
    }
}

/// Sentiment classifier over an [`LlmBackend`].
///
/// Each call builds the prompt, asks the backend, validates the answer and
/// retries transient or malformed results up to the policy bound. It never
/// returns an error: exhaustion yields [`ClassificationResult::Failed`].
pub struct SentimentClassifier<B, S = ThreadSleeper> {
    backend: B,
    system_prompt: String,
    static_prompt: String,
    policy: RetryPolicy,
    sleeper: S,
}

impl<B: LlmBackend> SentimentClassifier<B, ThreadSleeper> {
    pub fn new(backend: B, prompt: &PromptConfig, policy: RetryPolicy) -> Self {
        Self {
            backend,
            system_prompt: prompt.system_prompt.clone(),
            static_prompt: prompt.static_prompt.clone(),
            policy,
            sleeper: ThreadSleeper,
        }
    }

    /// Prompts from `[prompt]`, retry bound and interval from `[llm]`.
    pub fn from_config(backend: B, config: &MoodsheetConfig) -> Self {
        let policy = RetryPolicy::from_secs_f64(config.llm.max_retries, config.llm.retry_interval);
        Self::new(backend, &config.prompt, policy)
    }
}

impl<B: LlmBackend, S: Sleeper> SentimentClassifier<B, S> {
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> SentimentClassifier<B, T> {
        SentimentClassifier {
            backend: self.backend,
            system_prompt: self.system_prompt,
            static_prompt: self.static_prompt,
            policy: self.policy,
            sleeper,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn classify(&self, contents: &[String]) -> ClassificationResult {
        let prompt = build_prompt(&self.static_prompt, contents);
        let max = self.policy.max_attempts;

        let result = Retry::execute(&self.policy, &self.sleeper, |attempt| {
            self.attempt(&prompt, attempt, max)
        });

        match result.outcome {
            Ok(sentiment) => {
                tracing::debug!("sentiment result: {sentiment}");
                sentiment.into()
            }
            Err(err) => {
                tracing::error!(
                    "{} persisted through all {} attempts, giving up: {err}",
                    err.kind(),
                    result.attempts
                );
                ClassificationResult::Failed {
                    kind: err.kind(),
                    attempts: result.attempts,
                }
            }
        }
    }

    fn attempt(&self, prompt: &str, attempt: u32, max: u32) -> Result<Sentiment, AttemptError> {
        let raw = self
            .backend
            .complete(&self.system_prompt, prompt)
            .map_err(|e| {
                tracing::error!("LLM API call failed (attempt {attempt}/{max}): {e:#}");
                AttemptError::Provider(e)
            })?;

        let raw = raw.trim();
        tracing::debug!("raw API output (attempt {attempt}/{max}): {raw}");

        parse_sentiment(raw).map_err(|failure| {
            match &failure {
                ParseFailure::NotJson(_) => {
                    tracing::warn!("API returned non-JSON output: {raw} (attempt {attempt}/{max})")
                }
                ParseFailure::InvalidSentiment(_) => {
                    tracing::warn!("{failure} (attempt {attempt}/{max})")
                }
            }
            AttemptError::Malformed(failure)
        })
    }
}

impl<B: LlmBackend, S: Sleeper> Classifier for SentimentClassifier<B, S> {
    fn classify(&self, contents: &[String]) -> ClassificationResult {
        SentimentClassifier::classify(self, contents)
    }
}
