//! Prompt assembly for sentiment classification.
//!
//! The user message is the configured static instruction followed by the
//! row's content columns as a 1-indexed list. Pure string building, no
//! failure modes.

use std::fmt::Write;

/// Format contents as `Content <i>: <text>\n` lines, 1-indexed.
pub fn format_content_list<S: AsRef<str>>(contents: &[S]) -> String {
    let mut out = String::new();
    for (i, content) in contents.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "Content {}: {}", i + 1, content.as_ref());
    }
    out
}

/// Static instruction followed by the numbered content list.
pub fn build_prompt<S: AsRef<str>>(static_prompt: &str, contents: &[S]) -> String {
    let mut prompt = String::with_capacity(static_prompt.len() + contents.len() * 16);
    prompt.push_str(static_prompt);
    prompt.push_str(&format_content_list(contents));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn builds_numbered_listing_after_static_prompt() {
        let prompt = build_prompt("Classify:\n", &["good", "bad"]);
        assert_eq!(prompt, "Classify:\nContent 1: good\nContent 2: bad\n");
    }

    #[test]
    fn empty_content_yields_line_with_empty_body() {
        let prompt = build_prompt("", &["", "x"]);
        assert_eq!(prompt, "Content 1: \nContent 2: x\n");
    }

    #[test]
    fn no_contents_is_just_the_static_prompt() {
        let contents: [&str; 0] = [];
        assert_eq!(build_prompt("Only this", &contents), "Only this");
    }

    #[test]
    fn accepts_owned_strings() {
        let contents = vec!["a".to_string()];
        assert_eq!(format_content_list(&contents), "Content 1: a\n");
    }

    proptest! {
        #[test]
        fn prop_one_line_per_content(
            prefix in "[a-zA-Z :]{0,20}",
            contents in prop::collection::vec("[^\n\r]{0,30}", 0..10)
        ) {
            let prompt = build_prompt(&prefix, &contents);
            prop_assert!(prompt.starts_with(&prefix));

            let listing = &prompt[prefix.len()..];
            let lines: Vec<&str> = listing.lines().collect();
            prop_assert_eq!(lines.len(), contents.len());
            for (i, (line, content)) in lines.iter().zip(&contents).enumerate() {
                let expected = format!("Content {}: {}", i + 1, content);
                prop_assert_eq!(*line, expected.as_str());
            }
        }
    }
}
