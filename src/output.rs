// Text helpers shared by logging and the CLI.

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Respects UTF-8 character boundaries, so Chinese text and emoji in LLM
/// replies never cause a slicing panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate_chars("表情包", 3), "表情包");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn long_text_cuts_on_char_boundary() {
        assert_eq!(truncate_chars("猫咪摆pose", 2), "猫咪...");
        assert_eq!(truncate_chars("abcdef", 4), "abcd...");
    }
}
