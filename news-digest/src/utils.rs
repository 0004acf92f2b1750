/// Text processing utilities
pub mod text {
    /// Truncate to at most `max_chars` characters, never splitting a char.
    pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &text[..byte_idx],
            None => text,
        }
    }

    /// Number of whitespace-separated words
    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Collapse runs of whitespace into single spaces and trim the ends
    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Split text into sentences on terminal punctuation, keeping the punctuation
    pub fn split_sentences(text: &str) -> Vec<&str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            if matches!(c, '.' | '!' | '?') {
                let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
                if at_boundary {
                    let end = idx + c.len_utf8();
                    let sentence = text[start..end].trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    start = end;
                }
            }
        }

        let rest = text[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest);
        }
        sentences
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    /// Extract domain from URL
    pub fn extract_domain(url_str: &str) -> Option<String> {
        Url::parse(url_str).ok()?.domain().map(|d| d.to_string())
    }

    /// Validate feed URL format
    pub fn is_valid_feed_url(url_str: &str) -> bool {
        if let Ok(url) = Url::parse(url_str) {
            (url.scheme() == "http" || url.scheme() == "https") && url.host_str().is_some()
        } else {
            false
        }
    }
}

/// Time utilities
pub mod time {
    use std::time::Duration;

    /// Format duration in human-readable form
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();

        if total_seconds == 0 {
            format!("{}ms", duration.as_millis())
        } else if total_seconds < 60 {
            format!("{}s", total_seconds)
        } else if total_seconds < 3600 {
            format!("{}m{}s", total_seconds / 60, total_seconds % 60)
        } else {
            format!("{}h{}m", total_seconds / 3600, (total_seconds % 3600) / 60)
        }
    }
}
