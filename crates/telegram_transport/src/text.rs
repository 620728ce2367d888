//! Text helpers - chunking long messages and escaping dynamic content

/// Telegram rejects messages longer than this many characters.
pub const MESSAGE_LIMIT: usize = 4096;

/// Split `text` into chunks of at most `limit` characters, preferring to
/// break at paragraph boundaries, then line breaks, then spaces, and only
/// then mid-word.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    assert!(limit > 0);

    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.len() > limit {
        // Candidate window must end on a char boundary.
        let mut window_end = limit;
        while !rest.is_char_boundary(window_end) {
            window_end -= 1;
        }
        let window = &rest[..window_end];

        let split_at = window
            .rfind("\n\n")
            .map(|i| i + 2)
            .or_else(|| window.rfind('\n').map(|i| i + 1))
            .or_else(|| window.rfind(' ').map(|i| i + 1))
            .unwrap_or(window_end);

        chunks.push(rest[..split_at].trim_end_matches('\n').to_string());
        rest = &rest[split_at..];
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}

/// Escape user-supplied content embedded in Markdown-formatted messages.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_message("hello", 4096), vec!["hello".to_string()]);
    }

    #[test]
    fn test_split_prefers_paragraph_breaks() {
        let text = format!("{}\n\n{}", "a".repeat(30), "b".repeat(30));
        let chunks = split_message(&text, 40);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a".repeat(30));
        assert_eq!(chunks[1], "b".repeat(30));
    }

    #[test]
    fn test_split_falls_back_to_spaces() {
        let text = format!("{} {}", "a".repeat(30), "b".repeat(30));
        let chunks = split_message(&text, 40);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], format!("{} ", "a".repeat(30)));
        assert_eq!(chunks[1], "b".repeat(30));
    }

    #[test]
    fn test_hard_split_without_boundaries() {
        let text = "a".repeat(100);
        let chunks = split_message(&text, 40);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= 40));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_no_chunk_exceeds_limit() {
        let text = "word ".repeat(2000);
        for chunk in split_message(&text, MESSAGE_LIMIT) {
            assert!(chunk.len() <= MESSAGE_LIMIT);
        }
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a_b*c`d[e"), "a\\_b\\*c\\`d\\[e");
        assert_eq!(escape_markdown("plain"), "plain");
    }
}
