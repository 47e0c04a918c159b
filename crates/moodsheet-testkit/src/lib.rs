use moodsheet_config::{ExcelConfig, LlmConfig, MoodsheetConfig, PromptConfig};
use moodsheet_logging::{LogLevel, LoggingConfig};
use moodsheet_schema::{Cell, Table};
use std::path::PathBuf;

pub mod proptest;

/// Small helpers for building fixtures in tests.
///
/// Keeping these in a microcrate avoids copy-paste across engine/llm/sheet/cli tests.
pub const CONFIG_TOML: &str = r#"
[llm]
base_url = "http://127.0.0.1:9/v1"
api_key = "sk-test"
model = "test-model"
max_tokens = 20
temperature = 0.0
timeout = 5
max_retries = 3
retry_interval = 0.0

[prompt]
system_prompt = "You are a sentiment classifier. Answer with JSON."
static_prompt = "Classify the overall sentiment of:\n"

[excel]
content_columns = ["title", "review"]
output_column = "sentiment"

[logging]
level = "DEBUG"
path = "logs/moodsheet.log"
console_output = false
"#;

/// The configuration [`CONFIG_TOML`] describes, built directly.
pub fn config_fixture() -> MoodsheetConfig {
    MoodsheetConfig {
        llm: LlmConfig {
            base_url: "http://127.0.0.1:9/v1".into(),
            api_key: "sk-test".into(),
            model: "test-model".into(),
            max_tokens: 20,
            temperature: 0.0,
            timeout: 5,
            max_retries: 3,
            retry_interval: 0.0,
        },
        prompt: PromptConfig {
            system_prompt: "You are a sentiment classifier. Answer with JSON.".into(),
            static_prompt: "Classify the overall sentiment of:\n".into(),
        },
        excel: ExcelConfig {
            content_columns: vec!["title".into(), "review".into()],
            output_column: "sentiment".into(),
        },
        logging: LoggingConfig {
            level: LogLevel::Debug,
            path: PathBuf::from("logs/moodsheet.log"),
            console_output: false,
        },
    }
}

/// Write `contents` to `config.toml` in a fresh temp dir.
///
/// Keep the returned guard alive for as long as the file is needed.
pub fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

/// Table named `Sheet1` with text cells; empty strings become empty cells.
pub fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
    Table::new("Sheet1", headers.iter().map(|h| h.to_string()).collect()).with_rows(
        rows.iter()
            .map(|r| {
                r.iter()
                    .map(|v| if v.is_empty() { Cell::Empty } else { Cell::from(*v) })
                    .collect()
            })
            .collect(),
    )
}

/// Review table over the fixture's content columns.
pub fn review_table() -> Table {
    table(
        &["id", "title", "review"],
        &[
            &["1", "Great phone", "Battery lasts two days"],
            &["2", "Meh", "Does the job"],
            &["3", "Broken", "Screen cracked on arrival"],
        ],
    )
}

/// Well-formed model answer carrying `label`.
pub fn sentiment_json(label: &str) -> String {
    serde_json::json!({ "sentiment": label }).to_string()
}

/// Values of column `name`, as text.
pub fn column_text(table: &Table, name: &str) -> Vec<String> {
    let Some(col) = table.column_index(name) else {
        return Vec::new();
    };
    (0..table.row_count())
        .map(|row| table.cell(row, col).text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_toml_matches_fixture() {
        assert_eq!(
            MoodsheetConfig::from_toml_str(CONFIG_TOML).unwrap(),
            config_fixture()
        );
    }

    #[test]
    fn table_builder_maps_blanks_to_empty() {
        let t = table(&["a", "b"], &[&["x", ""]]);
        assert_eq!(t.rows[0], vec![Cell::from("x"), Cell::Empty]);
        assert_eq!(column_text(&t, "b"), vec![""]);
        assert!(column_text(&t, "missing").is_empty());
    }

    #[test]
    fn sentiment_json_is_parseable() {
        let v: serde_json::Value = serde_json::from_str(&sentiment_json("neutral")).unwrap();
        assert_eq!(v["sentiment"], "neutral");
    }
}
