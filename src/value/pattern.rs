//! SQL LIKE pattern matching
//!
//! `%` matches any run of characters, `_` exactly one. An optional escape
//! character makes the following character literal. Patterns are
//! translated once into an anchored regex.

use regex::{Regex, RegexBuilder};

/// A compiled LIKE/ILIKE pattern
#[derive(Debug, Clone)]
pub struct LikePattern {
    regex: Regex,
}

impl LikePattern {
    /// Compiles `pattern`; a trailing lone escape character matches itself
    pub fn compile(
        pattern: &str,
        escape: Option<char>,
        case_insensitive: bool,
    ) -> Result<Self, regex::Error> {
        let mut translated = String::with_capacity(pattern.len() * 2 + 2);
        translated.push('^');

        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            if Some(c) == escape {
                let literal = chars.next().unwrap_or(c);
                translated.push_str(&regex::escape(literal.encode_utf8(&mut [0u8; 4])));
                continue;
            }
            match c {
                '%' => translated.push_str(".*"),
                '_' => translated.push('.'),
                other => translated.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
            }
        }
        translated.push('$');

        let regex = RegexBuilder::new(&translated)
            .case_insensitive(case_insensitive)
            .dot_matches_new_line(true)
            .build()?;
        Ok(Self { regex })
    }

    /// Returns true if the whole `text` matches
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like(pattern: &str, text: &str) -> bool {
        LikePattern::compile(pattern, None, false).unwrap().matches(text)
    }

    #[test]
    fn test_wildcards() {
        assert!(like("a%", "abc"));
        assert!(like("%c", "abc"));
        assert!(like("a_c", "abc"));
        assert!(!like("a_c", "abbc"));
        assert!(like("%", ""));
        assert!(like("a%", "a\nb"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(like("1.5%", "1.5 kg"));
        assert!(!like("1.5%", "105 kg"));
        assert!(like("(a)", "(a)"));
    }

    #[test]
    fn test_escape() {
        let p = LikePattern::compile("100!%", Some('!'), false).unwrap();
        assert!(p.matches("100%"));
        assert!(!p.matches("1000"));

        let trailing = LikePattern::compile("ab!", Some('!'), false).unwrap();
        assert!(trailing.matches("ab!"));
    }

    #[test]
    fn test_case_insensitive() {
        let p = LikePattern::compile("SMITH%", None, true).unwrap();
        assert!(p.matches("smithers"));
        assert!(!LikePattern::compile("SMITH%", None, false).unwrap().matches("smithers"));
    }
}
