use crate::domain::SearchResult;

/// Renders search results as numbered excerpts for a prompt.
///
/// Each excerpt reads `[Excerpt i - Score: s]` followed by the chunk text,
/// with a blank line between excerpts. No results yield an empty string.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[Excerpt {} - Score: {:.3}]\n{}\n", i + 1, r.score, r.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_empty() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_format_single() {
        let out = format_context(&[SearchResult::new("Paris is in France.", 0.87654)]);
        assert_eq!(out, "[Excerpt 1 - Score: 0.877]\nParis is in France.\n");
    }

    #[test]
    fn test_format_multiple_separated_by_blank_line() {
        let out = format_context(&[
            SearchResult::new("first", 1.0),
            SearchResult::new("second", 0.25),
        ]);
        assert_eq!(
            out,
            "[Excerpt 1 - Score: 1.000]\nfirst\n\n[Excerpt 2 - Score: 0.250]\nsecond\n"
        );
    }
}
