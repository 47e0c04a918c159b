use anyhow::Result;
use moodsheet_config::ExcelConfig;
use moodsheet_engine::{Engine, RunSummary};
use moodsheet_llm::{ScriptedLlmBackend, SentimentClassifier};
use moodsheet_ports::{Classifier, TableReader, TableWriter};
use moodsheet_retry::{RecordingSleeper, RetryPolicy};
use moodsheet_schema::{Cell, ClassificationResult, ERROR_LABEL, FailureKind, Sentiment, Table};
use moodsheet_testkit::{column_text, config_fixture, review_table, sentiment_json, table};
use proptest::prelude::*;
use std::cell::RefCell;
use std::time::Duration;

/// Labels rows by the length of their first field and records every call.
#[derive(Default)]
struct RecordingClassifier {
    calls: RefCell<Vec<Vec<String>>>,
}

impl Classifier for RecordingClassifier {
    fn classify(&self, contents: &[String]) -> ClassificationResult {
        self.calls.borrow_mut().push(contents.to_vec());
        match contents.first().map(String::len).unwrap_or(0) % 4 {
            0 => Sentiment::Neutral.into(),
            1 => Sentiment::Positive.into(),
            2 => Sentiment::Negative.into(),
            _ => ClassificationResult::Failed {
                kind: FailureKind::Provider,
                attempts: 3,
            },
        }
    }
}

struct FixedReader(Table);

impl TableReader for FixedReader {
    fn read_table(&self) -> Result<Table> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct CapturingWriter {
    written: RefCell<Option<Table>>,
}

impl TableWriter for CapturingWriter {
    fn write_table(&self, table: &Table) -> Result<()> {
        *self.written.borrow_mut() = Some(table.clone());
        Ok(())
    }
}

struct FailingWriter;

impl TableWriter for FailingWriter {
    fn write_table(&self, _table: &Table) -> Result<()> {
        anyhow::bail!("disk full")
    }
}

fn excel() -> ExcelConfig {
    config_fixture().excel
}

#[test]
fn appends_one_label_per_row_in_order() {
    let backend = ScriptedLlmBackend::responses([
        sentiment_json("positive"),
        sentiment_json("neutral"),
        sentiment_json("negative"),
    ]);
    let config = config_fixture();
    let classifier = SentimentClassifier::from_config(backend, &config)
        .with_sleeper(RecordingSleeper::new());
    let engine = Engine::new(&classifier);

    let out = engine.process(review_table(), &config.excel).unwrap();

    assert_eq!(out.table.headers, vec!["id", "title", "review", "sentiment"]);
    assert_eq!(
        column_text(&out.table, "sentiment"),
        vec!["positive", "neutral", "negative"]
    );
    assert_eq!(column_text(&out.table, "title"), column_text(&review_table(), "title"));
    assert_eq!(out.summary.rows, 3);
    assert_eq!(classifier.backend().calls(), 3);

    let prompts: Vec<String> = classifier.backend().requests().into_iter().map(|(_, u)| u).collect();
    assert_eq!(
        prompts[0],
        "Classify the overall sentiment of:\nContent 1: Great phone\nContent 2: Battery lasts two days\n"
    );
}

#[test]
fn failed_rows_get_error_label_and_run_continues() {
    let backend = ScriptedLlmBackend::responses([
        "not json".to_string(),
        "still not".to_string(),
        "nope".to_string(),
        sentiment_json("positive"),
    ]);
    let classifier = SentimentClassifier::new(
        backend,
        &config_fixture().prompt,
        RetryPolicy::new(3, Duration::from_secs(1)),
    )
    .with_sleeper(RecordingSleeper::new());
    let engine = Engine::new(&classifier);
    let input = table(&["title", "review"], &[&["a", "b"], &["c", "d"]]);

    let out = engine.process(input, &excel()).unwrap();

    assert_eq!(column_text(&out.table, "sentiment"), vec![ERROR_LABEL, "positive"]);
    assert_eq!(out.summary.errors, 1);
    assert_eq!(out.summary.positive, 1);
    assert_eq!(classifier.sleeper().delays(), vec![Duration::from_secs(1); 2]);
}

#[test]
fn missing_column_fails_before_any_call() {
    let classifier = RecordingClassifier::default();
    let engine = Engine::new(&classifier);
    let input = table(&["title"], &[&["x"]]);

    let err = engine.process(input, &excel()).unwrap_err();

    assert!(err.to_string().contains("review"), "{err}");
    assert!(classifier.calls.borrow().is_empty());
}

#[test]
fn missing_cells_are_sent_as_empty_strings() {
    let classifier = RecordingClassifier::default();
    let engine = Engine::new(&classifier);
    let mut input = table(&["title", "review"], &[&["only title"]]);
    input.rows.push(vec![]);

    engine.process(input, &excel()).unwrap();

    assert_eq!(
        *classifier.calls.borrow(),
        vec![
            vec!["only title".to_string(), String::new()],
            vec![String::new(), String::new()]
        ]
    );
}

#[test]
fn existing_output_column_is_replaced() {
    let classifier = RecordingClassifier::default();
    let engine = Engine::new(&classifier);
    let input = table(
        &["title", "sentiment", "review"],
        &[&["x", "stale", "y"], &["xy", "stale", "z"]],
    );

    let out = engine.process(input, &excel()).unwrap();

    assert_eq!(out.table.headers, vec!["title", "sentiment", "review"]);
    assert_eq!(column_text(&out.table, "sentiment"), vec!["positive", "negative"]);
}

#[test]
fn empty_table_writes_header_only() {
    let classifier = RecordingClassifier::default();
    let engine = Engine::new(&classifier);

    let out = engine.process(table(&["title", "review"], &[]), &excel()).unwrap();

    assert_eq!(out.table.headers, vec!["title", "review", "sentiment"]);
    assert_eq!(out.table.row_count(), 0);
    assert_eq!(out.summary, RunSummary::default());
}

#[test]
fn run_reads_processes_and_writes() {
    let classifier = RecordingClassifier::default();
    let engine = Engine::new(&classifier);
    let reader = FixedReader(review_table());
    let writer = CapturingWriter::default();

    let summary = engine.run(&reader, &writer, &excel()).unwrap();

    let written = writer.written.borrow().clone().unwrap();
    assert_eq!(written.row_count(), 3);
    assert_eq!(written.headers.last().map(String::as_str), Some("sentiment"));
    assert_eq!(summary.rows, 3);
}

#[test]
fn run_surfaces_write_errors() {
    let classifier = RecordingClassifier::default();
    let engine = Engine::new(&classifier);

    let err = engine
        .run(&FixedReader(review_table()), &FailingWriter, &excel())
        .unwrap_err();

    assert!(err.to_string().contains("disk full"));
}

#[test]
fn numeric_cells_are_sent_as_text() {
    let classifier = RecordingClassifier::default();
    let engine = Engine::new(&classifier);
    let input = Table::new("Data", vec!["title".into(), "review".into()])
        .with_rows(vec![vec![Cell::Float(5.0), Cell::Bool(false)]]);

    engine.process(input, &excel()).unwrap();

    assert_eq!(classifier.calls.borrow()[0], vec!["5", "FALSE"]);
}

proptest! {
    #[test]
    fn prop_one_label_per_row_and_other_cells_untouched(
        input in moodsheet_testkit::proptest::strategy_table(
            vec!["id".into(), "title".into(), "review".into()],
            12,
        )
    ) {
        let classifier = RecordingClassifier::default();
        let engine = Engine::new(&classifier);

        let out = engine.process(input.clone(), &excel()).unwrap();

        prop_assert_eq!(out.table.row_count(), input.row_count());
        prop_assert_eq!(classifier.calls.borrow().len(), input.row_count());
        prop_assert_eq!(out.summary.rows, input.row_count());

        let col = out.table.column_index("sentiment").unwrap();
        prop_assert_eq!(col, 3);
        for (i, row) in out.table.rows.iter().enumerate() {
            prop_assert!(matches!(&row[col], Cell::Text(_)));
            for c in 0..input.headers.len() {
                prop_assert_eq!(out.table.cell(i, c), input.cell(i, c));
            }
        }
    }
}
