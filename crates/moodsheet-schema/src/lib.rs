//! Canonical data types for the moodsheet pipeline.
//!
//! Defines sentiment labels and classification results, plus the in-memory
//! spreadsheet model (cells, tables, rows) that the reader, the row processor
//! and the writer pass between each other. All other crates depend on these
//! types.

pub mod sentiment;
pub mod table;

pub use sentiment::{ClassificationResult, ERROR_LABEL, FailureKind, Sentiment};
pub use table::{Cell, Row, Table};
