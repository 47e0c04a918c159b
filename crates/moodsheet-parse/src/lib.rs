//! Validation of the model's structured output.
//!
//! JSON mode is a request, not a guarantee, so every response is parsed and
//! its `sentiment` field checked against the label set before it is trusted.

use moodsheet_schema::{FailureKind, Sentiment};
use serde_json::Value;
use std::fmt;

/// Why a raw response was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseFailure {
    /// Not parseable as JSON at all.
    NotJson(String),
    /// Parsed, but `sentiment` is missing, not a string, or not a known label.
    /// Carries the offending value rendered as JSON, if there was one.
    InvalidSentiment(Option<String>),
}

impl ParseFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            ParseFailure::NotJson(_) => FailureKind::NotJson,
            ParseFailure::InvalidSentiment(_) => FailureKind::InvalidSentiment,
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::NotJson(err) => write!(f, "response is not JSON: {err}"),
            ParseFailure::InvalidSentiment(Some(v)) => write!(f, "invalid sentiment value: {v}"),
            ParseFailure::InvalidSentiment(None) => write!(f, "sentiment field missing"),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// Parse a raw model response into a [`Sentiment`].
///
/// Surrounding whitespace is ignored. A JSON value that is not an object is
/// treated like an object without a `sentiment` field.
pub fn parse_sentiment(raw: &str) -> Result<Sentiment, ParseFailure> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|e| ParseFailure::NotJson(e.to_string()))?;

    match value.get("sentiment") {
        Some(Value::String(label)) => Sentiment::from_label(label)
            .ok_or_else(|| ParseFailure::InvalidSentiment(Some(Value::from(label.as_str()).to_string()))),
        Some(other) => Err(ParseFailure::InvalidSentiment(Some(other.to_string()))),
        None => Err(ParseFailure::InvalidSentiment(None)),
    }
}
