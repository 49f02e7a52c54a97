//! Sentence splitting for text ingestion.

/// Split `text` on `.` into trimmed, non-empty segments, in order.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}
