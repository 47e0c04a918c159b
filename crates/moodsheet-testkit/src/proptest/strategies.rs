use moodsheet_schema::{Cell, Sentiment, Table};
use proptest::prelude::*;

// ============================================================================
// Labels and model answers
// ============================================================================

pub fn strategy_sentiment() -> impl Strategy<Value = Sentiment> {
    prop::sample::select(Sentiment::ALL.to_vec())
}

/// A well-formed `{"sentiment": ...}` answer, possibly padded with whitespace
/// or carrying an extra field.
pub fn strategy_valid_response() -> impl Strategy<Value = (Sentiment, String)> {
    (strategy_sentiment(), "[ \n\t]{0,3}", any::<bool>()).prop_map(|(s, pad, extra)| {
        let body = if extra {
            serde_json::json!({ "sentiment": s.as_str(), "confidence": 0.5 })
        } else {
            serde_json::json!({ "sentiment": s.as_str() })
        };
        (s, format!("{pad}{body}{pad}"))
    })
}

/// Any raw answer a model might give: valid, off-label, wrong shape, or prose.
pub fn strategy_llm_response() -> impl Strategy<Value = String> {
    prop_oneof![
        strategy_valid_response().prop_map(|(_, raw)| raw),
        "[a-zA-Z]{0,12}".prop_map(|l| serde_json::json!({ "sentiment": l }).to_string()),
        Just(r#"{"label":"positive"}"#.to_string()),
        Just(r#"["positive"]"#.to_string()),
        Just(r#"{"sentiment":1}"#.to_string()),
        ".{0,40}",
    ]
}

// ============================================================================
// Spreadsheet data
// ============================================================================

/// Free text as found in review-style cells.
pub fn strategy_content_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.!?'-]{0,60}"
}

pub fn strategy_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Empty),
        strategy_content_text().prop_map(Cell::Text),
        (-1.0e6..1.0e6f64).prop_map(Cell::Float),
        any::<i32>().prop_map(|n| Cell::Int(i64::from(n))),
        any::<bool>().prop_map(Cell::Bool),
    ]
}

/// Table with the given headers and up to `max_rows` rows of random cells.
/// Rows are sometimes shorter than the header.
pub fn strategy_table(headers: Vec<String>, max_rows: usize) -> impl Strategy<Value = Table> {
    let width = headers.len();
    prop::collection::vec(prop::collection::vec(strategy_cell(), 0..=width), 0..=max_rows)
        .prop_map(move |rows| Table::new("Sheet1", headers.clone()).with_rows(rows))
}
