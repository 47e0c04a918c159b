//! Row processor for the moodsheet pipeline.
//!
//! Checks the input shape, classifies each row in order through a
//! [`Classifier`] and writes the labels back as one column. Classification
//! problems never abort a run; only input-shape and I/O errors do.

use anyhow::Result;
use moodsheet_config::ExcelConfig;
use moodsheet_ports::{Classifier, TableReader, TableWriter};
use moodsheet_schema::{Cell, ClassificationResult, Row, Sentiment, Table};
use std::fmt;

/// Label counts for one processed table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &ClassificationResult) {
        self.rows += 1;
        match result.sentiment() {
            Some(Sentiment::Positive) => self.positive += 1,
            Some(Sentiment::Neutral) => self.neutral += 1,
            Some(Sentiment::Negative) => self.negative += 1,
            None => self.errors += 1,
        }
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }
}

impl<'a> FromIterator<&'a ClassificationResult> for RunSummary {
    fn from_iter<I: IntoIterator<Item = &'a ClassificationResult>>(iter: I) -> Self {
        let mut summary = RunSummary::default();
        for result in iter {
            summary.record(result);
        }
        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows: {} positive, {} neutral, {} negative, {} errors",
            self.rows, self.positive, self.neutral, self.negative, self.errors
        )
    }
}

/// Output of [`Engine::process`].
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    pub table: Table,
    pub summary: RunSummary,
}

pub struct Engine<'a> {
    pub classifier: &'a dyn Classifier,
}

impl<'a> Engine<'a> {
    pub fn new(classifier: &'a dyn Classifier) -> Self {
        Self { classifier }
    }

    /// Classify every row of `table` and attach the labels as
    /// `excel.output_column`.
    ///
    /// Fails before any classification when a content column is missing.
    pub fn process(&self, mut table: Table, excel: &ExcelConfig) -> Result<Processed> {
        let missing = table.missing_columns(&excel.content_columns);
        if !missing.is_empty() {
            anyhow::bail!(
                "input sheet {:?} is missing configured column(s): {}",
                table.sheet_name,
                missing.join(", ")
            );
        }

        let results = self.classify_rows(&table, &excel.content_columns);
        let summary: RunSummary = results.iter().collect();

        let labels = results
            .iter()
            .map(|r| Cell::Text(r.label().to_string()))
            .collect();
        table.set_column(&excel.output_column, labels);

        tracing::info!("sentiment summary: {summary}");
        Ok(Processed { table, summary })
    }

    /// One result per row, in row order. Strictly sequential.
    pub fn classify_rows(&self, table: &Table, columns: &[String]) -> Vec<ClassificationResult> {
        let total = table.row_count();
        (0..total)
            .map(|index| {
                tracing::info!("processing row {}/{}", index + 1, total);
                let row = Row::from_table(table, index, columns);
                self.classifier.classify(&row.contents())
            })
            .collect()
    }

    /// Read, process and write a whole table.
    pub fn run(
        &self,
        reader: &dyn TableReader,
        writer: &dyn TableWriter,
        excel: &ExcelConfig,
    ) -> Result<RunSummary> {
        let table = reader.read_table()?;
        tracing::info!(
            "read sheet {:?}: {} rows, {} columns",
            table.sheet_name,
            table.row_count(),
            table.headers.len()
        );

        let Processed { table, summary } = self.process(table, excel)?;
        writer.write_table(&table)?;
        Ok(summary)
    }
}
