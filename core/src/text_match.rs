//! `TextMatcher`: string predicates
//!
//! Exact, prefix, suffix, contains and regex matching on `Value::String`
//! subjects, each optionally ASCII case-insensitive. Non-string subjects never
//! match.

use crate::{PatternError, Value, MAX_REGEX_PATTERN_LENGTH};

/// Unified string matcher.
///
/// # Example
///
/// ```
/// use pura::{TextMatcher, Value};
///
/// let m = TextMatcher::prefix("/API/", true);
/// assert!(m.matches(&Value::from("/api/users")));
///
/// let m = TextMatcher::regex(r"^user-\d+$").unwrap();
/// assert!(m.matches(&Value::from("user-123")));
/// assert!(!m.matches(&Value::from(123)));
/// ```
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Exact string equality.
    Exact { value: String, ignore_case: bool },
    /// String prefix match.
    Prefix { value: String, ignore_case: bool },
    /// String suffix match.
    Suffix { value: String, ignore_case: bool },
    /// Substring contains match.
    Contains { value: String, ignore_case: bool },
    /// Regular expression match (RE2 semantics, linear time).
    Regex(regex::Regex),
}

impl TextMatcher {
    /// Create an exact match.
    #[must_use]
    pub fn exact(value: impl Into<String>, ignore_case: bool) -> Self {
        Self::Exact {
            value: value.into(),
            ignore_case,
        }
    }

    /// Create a prefix match.
    #[must_use]
    pub fn prefix(value: impl Into<String>, ignore_case: bool) -> Self {
        Self::Prefix {
            value: value.into(),
            ignore_case,
        }
    }

    /// Create a suffix match.
    #[must_use]
    pub fn suffix(value: impl Into<String>, ignore_case: bool) -> Self {
        Self::Suffix {
            value: value.into(),
            ignore_case,
        }
    }

    /// Create a contains match.
    ///
    /// When `ignore_case` is true the needle is lowercased once here rather
    /// than on every match.
    #[must_use]
    pub fn contains(value: impl Into<String>, ignore_case: bool) -> Self {
        let value = value.into();
        Self::Contains {
            value: if ignore_case {
                value.to_ascii_lowercase()
            } else {
                value
            },
            ignore_case,
        }
    }

    /// Create a regex match.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::PatternTooLong`] past
    /// [`MAX_REGEX_PATTERN_LENGTH`], or [`PatternError::InvalidRegex`] if the
    /// expression does not compile.
    pub fn regex(pattern: &str) -> Result<Self, PatternError> {
        Self::build_regex(pattern, pattern)
    }

    /// Create a case-insensitive regex match by prepending `(?i)`.
    ///
    /// # Errors
    ///
    /// Same as [`regex`](Self::regex).
    pub fn regex_ignore_case(pattern: &str) -> Result<Self, PatternError> {
        Self::build_regex(pattern, &format!("(?i){pattern}"))
    }

    fn build_regex(original: &str, source: &str) -> Result<Self, PatternError> {
        if original.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(PatternError::PatternTooLong {
                len: original.len(),
                max: MAX_REGEX_PATTERN_LENGTH,
            });
        }
        regex::Regex::new(source)
            .map(Self::Regex)
            .map_err(|e| PatternError::InvalidRegex {
                pattern: original.to_string(),
                reason: e.to_string(),
            })
    }

    /// Check a subject. Only `Value::String` can match.
    #[must_use]
    pub fn matches(&self, subject: &Value) -> bool {
        let Some(input) = subject.as_str() else {
            return false;
        };

        match self {
            Self::Exact { value, ignore_case } => {
                if *ignore_case {
                    input.eq_ignore_ascii_case(value)
                } else {
                    input == value
                }
            }
            Self::Prefix { value, ignore_case } => {
                if *ignore_case {
                    input
                        .get(..value.len())
                        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(value))
                } else {
                    input.starts_with(value.as_str())
                }
            }
            Self::Suffix { value, ignore_case } => {
                if *ignore_case {
                    input
                        .len()
                        .checked_sub(value.len())
                        .and_then(|start| input.get(start..))
                        .is_some_and(|suffix| suffix.eq_ignore_ascii_case(value))
                } else {
                    input.ends_with(value.as_str())
                }
            }
            Self::Contains { value, ignore_case } => {
                if *ignore_case {
                    input.to_ascii_lowercase().contains(value.as_str())
                } else {
                    input.contains(value.as_str())
                }
            }
            Self::Regex(re) => re.is_match(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact() {
        let m = TextMatcher::exact("hello", false);
        assert!(m.matches(&"hello".into()));
        assert!(!m.matches(&"Hello".into()));

        let m = TextMatcher::exact("hello", true);
        assert!(m.matches(&"HELLO".into()));
    }

    #[test]
    fn test_prefix_suffix() {
        assert!(TextMatcher::prefix("/api/", false).matches(&"/api/users".into()));
        assert!(!TextMatcher::prefix("/api/", false).matches(&"/API/users".into()));
        assert!(TextMatcher::suffix(".JSON", true).matches(&"file.json".into()));
        assert!(!TextMatcher::suffix("long-suffix", true).matches(&"x".into()));
    }

    #[test]
    fn test_contains() {
        assert!(TextMatcher::contains("error", true).matches(&"an ERROR occurred".into()));
        assert!(!TextMatcher::contains("error", false).matches(&"an ERROR occurred".into()));
    }

    #[test]
    fn test_regex() {
        let m = TextMatcher::regex(r"^user-\d+$").unwrap();
        assert!(m.matches(&"user-123".into()));
        assert!(!m.matches(&"USER-123".into()));

        let m = TextMatcher::regex_ignore_case(r"^user-\d+$").unwrap();
        assert!(m.matches(&"USER-123".into()));
    }

    #[test]
    fn test_invalid_regex() {
        let err = TextMatcher::regex("(unclosed").unwrap_err();
        assert!(matches!(err, PatternError::InvalidRegex { .. }));
    }

    #[test]
    fn test_regex_too_long() {
        let long = "a".repeat(MAX_REGEX_PATTERN_LENGTH + 1);
        assert!(matches!(
            TextMatcher::regex(&long),
            Err(PatternError::PatternTooLong { .. })
        ));
    }

    #[test]
    fn test_non_string_never_matches() {
        let m = TextMatcher::exact("1", false);
        assert!(!m.matches(&Value::from(1)));
        assert!(!m.matches(&Value::Null));
    }
}
