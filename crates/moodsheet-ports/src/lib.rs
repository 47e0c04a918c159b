use anyhow::Result;
use moodsheet_schema::{ClassificationResult, Table};

/// Row classification.
///
/// Implementations never fail: every problem degrades to a
/// [`ClassificationResult::Failed`] so one bad row cannot abort a sheet.
pub trait Classifier {
    fn classify(&self, contents: &[String]) -> ClassificationResult;
}

/// Source of the input table.
///
/// Adapters live in `moodsheet-sheet`.
pub trait TableReader {
    fn read_table(&self) -> Result<Table>;
}

/// Sink for the labelled table.
pub trait TableWriter {
    fn write_table(&self, table: &Table) -> Result<()>;
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn classify(&self, contents: &[String]) -> ClassificationResult {
        (**self).classify(contents)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, contents: &[String]) -> ClassificationResult {
        (**self).classify(contents)
    }
}
