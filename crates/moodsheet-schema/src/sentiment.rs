use serde::{Deserialize, Serialize};
use std::fmt;

/// Label written when a row could not be classified.
pub const ERROR_LABEL: &str = "LLM processing error";

/// The three sentiment labels a model is allowed to answer with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// Exact, case-sensitive match against the label set.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == label)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a classification ended without a label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transport, timeout, non-2xx status, or a response without content.
    Provider,
    /// The model answered with something that is not JSON.
    NotJson,
    /// JSON came back but `sentiment` was missing or outside the label set.
    InvalidSentiment,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Provider => write!(f, "provider error"),
            FailureKind::NotJson => write!(f, "non-JSON output"),
            FailureKind::InvalidSentiment => write!(f, "invalid sentiment"),
        }
    }
}

/// Outcome of classifying one row.
///
/// Only [`ClassificationResult::label`] reaches the spreadsheet; the failure
/// detail is kept for logs and run summaries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationResult {
    Sentiment(Sentiment),
    Failed { kind: FailureKind, attempts: u32 },
}

impl ClassificationResult {
    pub fn label(&self) -> &'static str {
        match self {
            ClassificationResult::Sentiment(s) => s.as_str(),
            ClassificationResult::Failed { .. } => ERROR_LABEL,
        }
    }

    pub fn sentiment(&self) -> Option<Sentiment> {
        match self {
            ClassificationResult::Sentiment(s) => Some(*s),
            ClassificationResult::Failed { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ClassificationResult::Failed { .. })
    }
}

impl From<Sentiment> for ClassificationResult {
    fn from(s: Sentiment) -> Self {
        ClassificationResult::Sentiment(s)
    }
}
