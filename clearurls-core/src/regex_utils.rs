//! regex_utils.rs - Helpers to combine rule fragments into single patterns.
//!
//! The rules document lists many small alternative fragments per field. They
//! are combined once into one alternation so a provider evaluates a single
//! regular expression per field instead of one per fragment.
//!
//! License: MIT OR APACHE 2.0

use regex::{Regex, RegexBuilder};

/// Inline flag making a pattern case-insensitive. Every pattern built by the
/// pipeline carries it.
pub const CASE_INSENSITIVE_PREFIX: &str = "(?i)";

/// Upper bound on the compiled size of one combined pattern.
const COMPILED_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Builds a pattern matching any of `fragments`, wrapped in `prefix`/`suffix`.
///
/// Each fragment gets its own non-capturing group so a `|` inside a fragment
/// cannot leak into its neighbours or escape the anchors. Returns an empty
/// string for an empty list, which the pipeline treats as "matches nothing".
pub fn any_of<S: AsRef<str>>(fragments: &[S], prefix: &str, suffix: &str) -> String {
    if fragments.is_empty() {
        return String::new();
    }
    let joined = fragments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(")|(?:");
    format!("{prefix}(?:(?:{joined})){suffix}")
}

/// Prefixes `pattern` with the case-insensitive flag, keeping empty patterns empty.
pub fn case_insensitive(pattern: &str) -> String {
    if pattern.is_empty() {
        return String::new();
    }
    format!("{CASE_INSENSITIVE_PREFIX}{pattern}")
}

/// Compiles a pattern with the size limits used across the pipeline.
pub fn build_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .size_limit(COMPILED_SIZE_LIMIT)
        .build()
}

/// Compiles `pattern` unless it is empty.
pub fn build_optional_regex(pattern: &str) -> Result<Option<Regex>, regex::Error> {
    if pattern.is_empty() {
        return Ok(None);
    }
    build_regex(pattern).map(Some)
}

/// Compiles a single fragment on demand, the way it would appear inside the
/// combined pattern (same anchors, same flags).
pub fn build_fragment_regex(fragment: &str, prefix: &str, suffix: &str) -> Result<Regex, regex::Error> {
    build_regex(&case_insensitive(&any_of(&[fragment], prefix, suffix)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_of_empty_is_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(any_of(&empty, "^", "$"), "");
        assert_eq!(case_insensitive(""), "");
    }

    #[test]
    fn test_any_of_wraps_each_fragment() {
        assert_eq!(any_of(&["utm_\\w+", "a|b"], "^", "$"), "^(?:(?:utm_\\w+)|(?:a|b))$");
        assert_eq!(any_of(&["x"], "", ""), "(?:(?:x))");
    }

    #[test]
    fn test_anchors_hold_across_inner_alternation() {
        let re = build_regex(&case_insensitive(&any_of(&["a|b"], "^", "$"))).unwrap();
        assert!(re.is_match("A"));
        assert!(re.is_match("b"));
        assert!(!re.is_match("ab"));
        assert!(!re.is_match("xa"));
    }

    #[test]
    fn test_build_optional_regex() {
        assert!(build_optional_regex("").unwrap().is_none());
        assert!(build_optional_regex("(?i)x").unwrap().is_some());
        assert!(build_optional_regex("(").is_err());
    }

    #[test]
    fn test_fragment_regex_is_case_insensitive() {
        let re = build_fragment_regex("utm_source", "^", "$").unwrap();
        assert!(re.is_match("UTM_Source"));
        assert!(!re.is_match("utm_source2"));
    }
}
