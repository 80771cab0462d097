use encoding_rs::UTF_8;

/// number of log characters kept in a report preview
pub const EXCERPT_CHARS: usize = 500;

/// keep the first `max_chars` characters of a log, marking the cut with "..."
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    // count characters, not bytes, so emoji in logs never split
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// preview of a raw log as shown in reports
pub fn log_excerpt(logs: &str) -> String {
    truncate_with_ellipsis(logs, EXCERPT_CHARS)
}

/// upper-case the first letter of every word and lower-case the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}

/// decode subprocess output; invalid bytes become U+FFFD
pub fn decode_output(content: &[u8]) -> String {
    UTF_8.decode_without_bom_handling(content).0.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_logs_are_cut_at_five_hundred_chars() {
        let logs = "a".repeat(600);
        let excerpt = log_excerpt(&logs);
        assert_eq!(excerpt.len(), 503);
        assert!(excerpt.ends_with("..."));
        assert_eq!(&excerpt[..500], &logs[..500]);
    }

    #[test]
    fn short_logs_are_kept_as_is() {
        let logs = "b".repeat(400);
        assert_eq!(log_excerpt(&logs), logs);
    }

    #[test]
    fn exactly_five_hundred_chars_gets_no_marker() {
        let logs = "c".repeat(500);
        assert_eq!(log_excerpt(&logs), logs);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let logs = "🚂".repeat(10);
        assert_eq!(truncate_with_ellipsis(&logs, 3), "🚂🚂🚂...");
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("dependency issues"), "Dependency Issues");
        assert_eq!(title_case("rAILWAY config"), "Railway Config");
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let decoded = decode_output(b"build failed \xff here");
        assert!(decoded.starts_with("build failed "));
        assert!(decoded.ends_with(" here"));
        assert!(decoded.contains('\u{FFFD}'));
    }
}
