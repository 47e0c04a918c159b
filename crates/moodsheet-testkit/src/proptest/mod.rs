//! Proptest strategies for moodsheet property-based testing
//!
//! Reusable generators for cells, tables, labels and raw model answers.

pub mod strategies;

pub use strategies::{
    strategy_cell, strategy_content_text, strategy_llm_response, strategy_sentiment,
    strategy_table, strategy_valid_response,
};
