//! Helpers for raw model output.

/// Number of characters of raw model output kept for diagnostics.
pub const RAW_CONTENT_LIMIT: usize = 500;

/// Appended to raw content that was cut at [`RAW_CONTENT_LIMIT`].
pub const TRUNCATION_MARKER: &str = "...";

/// Returns at most the first [`RAW_CONTENT_LIMIT`] characters of `raw`.
///
/// The [`TRUNCATION_MARKER`] is appended only when characters were dropped,
/// so short output is returned unchanged. Counting is by `char`, never
/// splitting a code point.
pub fn truncate_raw_content(raw: &str) -> String {
    match raw.char_indices().nth(RAW_CONTENT_LIMIT) {
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
            truncated.push_str(&raw[..cut]);
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => raw.to_owned(),
    }
}

/// Removes a surrounding markdown code fence (```` ```json ```` or ```` ``` ````).
///
/// Text without a leading fence is returned trimmed but otherwise untouched.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);

    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_not_marked() {
        assert_eq!(truncate_raw_content("not json"), "not json");
        assert_eq!(truncate_raw_content(""), "");
    }

    #[test]
    fn content_at_limit_is_not_marked() {
        let raw = "a".repeat(RAW_CONTENT_LIMIT);
        assert_eq!(truncate_raw_content(&raw), raw);
    }

    #[test]
    fn long_content_is_cut_and_marked() {
        let raw: String = (0..10_000).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let truncated = truncate_raw_content(&raw);

        assert_eq!(truncated.len(), RAW_CONTENT_LIMIT + TRUNCATION_MARKER.len());
        assert_eq!(&truncated[..RAW_CONTENT_LIMIT], &raw[..RAW_CONTENT_LIMIT]);
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let raw = "é".repeat(RAW_CONTENT_LIMIT + 1);
        let truncated = truncate_raw_content(&raw);

        assert_eq!(
            truncated.chars().count(),
            RAW_CONTENT_LIMIT + TRUNCATION_MARKER.len()
        );
    }

    #[test]
    fn strips_json_fence() {
        let text = "```json\n{\"nodes\":[]}\n```";
        assert_eq!(strip_code_fences(text), "{\"nodes\":[]}");
    }

    #[test]
    fn strips_bare_fence() {
        let text = "  ```\n{}\n```  ";
        assert_eq!(strip_code_fences(text), "{}");
    }

    #[test]
    fn leaves_unfenced_text() {
        assert_eq!(strip_code_fences(" {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fences("Here you go: {}"), "Here you go: {}");
    }
}
