//! SQL-style wildcard patterns.
//!
//! `%` matches any run of characters (including none) and `_` matches exactly
//! one character. Matching is anchored and case-insensitive.
//!
//! A plain string operand to [`CompareType::Like`](crate::CompareType::Like)
//! does **not** go through here: it only trims `%` from both ends and tests
//! for a substring, so `_` is literal there. Pass a [`WildcardPattern`] as the
//! operand to get full wildcard matching.

use std::fmt;

use regex::Regex;

use crate::error::Result;

/// A compiled wildcard pattern.
///
/// ```
/// use standout_sieve::WildcardPattern;
///
/// let pattern = WildcardPattern::new("j_n%").unwrap();
/// assert!(pattern.is_match("Jane Doe"));
/// assert!(pattern.is_match("jon"));
/// assert!(!pattern.is_match("jn"));
/// ```
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push_str("(?is)^");
        let mut literal = String::new();
        for ch in pattern.chars() {
            match ch {
                '%' | '_' => {
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                    expr.push_str(if ch == '%' { ".*" } else { "." });
                }
                other => literal.push(other),
            }
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        Ok(WildcardPattern {
            source: pattern.to_string(),
            regex: Regex::new(&expr)?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
