#![no_main]

use libfuzzer_sys::fuzz_target;
use moodsheet_prompt::build_prompt;

fuzz_target!(|input: (String, Vec<String>)| {
    let (static_prompt, contents) = input;
    let prompt = build_prompt(&static_prompt, &contents);

    assert!(prompt.starts_with(&static_prompt));
    for (i, c) in contents.iter().enumerate() {
        assert!(prompt.contains(&format!("Content {}: {c}\n", i + 1)));
    }
});
