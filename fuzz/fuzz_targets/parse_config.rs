//! Fuzz harness for the TOML configuration loader

#![no_main]

use libfuzzer_sys::fuzz_target;
use moodsheet_config::MoodsheetConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Whatever passes validation must keep passing it.
    if let Ok(config) = MoodsheetConfig::from_toml_str(input) {
        assert!(config.validate().is_ok());
        assert!(config.llm.max_retries >= 1);
        assert!(!config.excel.content_columns.is_empty());
    }
});
