//! Parsers for small numeric fields scraped from listing and detail pages

use regex::Regex;
use std::sync::LazyLock;

static FIRST_INTEGER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

static LEADING_INTEGER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+").unwrap());

/// Upvote count: the first integer embedded in the text, 0 when there is none.
/// Counts too large for `u32` saturate.
pub fn parse_upvotes(text: &str) -> u32 {
    FIRST_INTEGER_REGEX
        .find(text)
        .map(|m| m.as_str().parse().unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Rank from strings like `"2nd"` or `"1357th"`
pub fn parse_rank(text: &str) -> Option<u32> {
    LEADING_INTEGER_REGEX
        .find(text.trim())
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upvotes() {
        assert_eq!(parse_upvotes("42"), 42);
        assert_eq!(parse_upvotes("  17 votes"), 17);
        assert_eq!(parse_upvotes("votes: 3, comments: 9"), 3);
        assert_eq!(parse_upvotes(""), 0);
        assert_eq!(parse_upvotes("no votes"), 0);
    }

    #[test]
    fn test_huge_upvote_count_saturates() {
        assert_eq!(parse_upvotes("99999999999"), u32::MAX);
        assert_eq!(parse_upvotes("99999999999 votes"), u32::MAX);
    }

    #[test]
    fn test_parse_rank() {
        assert_eq!(parse_rank("2nd"), Some(2));
        assert_eq!(parse_rank("1357th"), Some(1357));
        assert_eq!(parse_rank(" 3rd "), Some(3));
        assert_eq!(parse_rank("Grandmaster"), None);
        assert_eq!(parse_rank(""), None);
    }
}
