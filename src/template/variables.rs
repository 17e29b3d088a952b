//! Placeholder scanning and variable extraction

use std::collections::BTreeSet;
use std::ops::Range;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A single `{{...}}` occurrence inside a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Byte offset of the opening `{{`
    pub start: usize,
    /// Byte offset one past the closing `}}`
    pub end: usize,
    /// Full token including braces
    pub token: &'a str,
    /// Text between the braces, untrimmed
    pub raw: &'a str,
}

impl<'a> Placeholder<'a> {
    /// Variable name: the inner text with surrounding whitespace trimmed.
    ///
    /// `{{   }}` yields the empty string.
    pub fn name(&self) -> &'a str {
        self.raw.trim()
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Iterator over the placeholders of a body, left to right, non-overlapping.
pub struct Placeholders<'a> {
    body: &'a str,
    pos: usize,
}

impl<'a> Iterator for Placeholders<'a> {
    type Item = Placeholder<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(offset) = self.body[self.pos..].find(OPEN) {
            let start = self.pos + offset;
            let inner_start = start + OPEN.len();
            let rest = &self.body[inner_start..];
            let inner_len = rest.find('}').unwrap_or(rest.len());
            let inner_end = inner_start + inner_len;

            if inner_len > 0 && self.body[inner_end..].starts_with(CLOSE) {
                let end = inner_end + CLOSE.len();
                self.pos = end;
                return Some(Placeholder {
                    start,
                    end,
                    token: &self.body[start..end],
                    raw: &self.body[inner_start..inner_end],
                });
            }

            // `{` is ASCII, so start + 1 is always a char boundary
            self.pos = start + 1;
        }

        self.pos = self.body.len();
        None
    }
}

/// Scan `body` for `{{name}}` placeholders.
///
/// A placeholder is `{{`, one or more characters other than `}`, then `}}`.
/// Unterminated or empty markers are skipped silently.
pub fn placeholders(body: &str) -> Placeholders<'_> {
    Placeholders { body, pos: 0 }
}

/// Extract the distinct, trimmed variable names referenced by `body`.
pub fn extract_variables(body: &str) -> BTreeSet<String> {
    placeholders(body).map(|p| p.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(body: &str) -> Vec<String> {
        extract_variables(body).into_iter().collect()
    }

    #[test]
    fn test_extract_two_variables() {
        assert_eq!(
            names("Hello {{name}}, welcome to {{place}}."),
            vec!["name", "place"]
        );
    }

    #[test]
    fn test_extract_plain_text_is_empty() {
        assert!(extract_variables("").is_empty());
        assert!(extract_variables("no placeholders here").is_empty());
        assert!(extract_variables("single {braces} only").is_empty());
    }

    #[test]
    fn test_extract_trims_and_dedupes() {
        assert_eq!(names("{{ a }}{{a}}"), vec!["a"]);
        assert_eq!(names("{{\tcustomer_name\n}} / {{customer_name}}"), vec!["customer_name"]);
    }

    #[test]
    fn test_extract_whitespace_only_yields_empty_name() {
        assert_eq!(names("{{   }}"), vec![""]);
    }

    #[test]
    fn test_extract_skips_malformed_markers() {
        assert!(extract_variables("{{}}").is_empty());
        assert!(extract_variables("{{unterminated").is_empty());
        assert!(extract_variables("{{a}b}}").is_empty());
        assert_eq!(names("{{a}b}} and {{ok}}"), vec!["ok"]);
    }

    #[test]
    fn test_extract_unclosed_marker_swallows_next_open() {
        // No `}` between the first `{{` and the final `}}`
        assert_eq!(names("{{broken {{ok}}"), vec!["broken {{ok"]);
    }

    #[test]
    fn test_extract_extra_open_brace_is_part_of_name() {
        // `{{{a}}` matches with inner text `{a`
        assert_eq!(names("{{{a}}"), vec!["{a"]);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let body = "Dear {{ title }} {{surname}}, your order {{order}} shipped.";
        assert_eq!(extract_variables(body), extract_variables(body));
    }

    #[test]
    fn test_placeholder_spans() {
        let body = "Hi {{ name }}!";
        let found: Vec<_> = placeholders(body).collect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token, "{{ name }}");
        assert_eq!(found[0].raw, " name ");
        assert_eq!(found[0].name(), "name");
        assert_eq!(&body[found[0].span()], "{{ name }}");
    }

    #[test]
    fn test_placeholders_with_multibyte_text() {
        let body = "Olá {{nome}}, até {{ dia }} 🎉";
        let found: Vec<_> = placeholders(body).map(|p| p.name()).collect();
        assert_eq!(found, vec!["nome", "dia"]);
    }
}
