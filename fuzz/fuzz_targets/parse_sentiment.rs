//! Fuzz harness for the model response parser
//!
//! Any string must either yield one of the three labels or a failure whose
//! kind is not a provider error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use moodsheet_parse::parse_sentiment;
use moodsheet_schema::{FailureKind, Sentiment};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    match parse_sentiment(raw) {
        Ok(s) => assert!(Sentiment::ALL.contains(&s)),
        Err(failure) => assert_ne!(failure.kind(), FailureKind::Provider),
    }
});
