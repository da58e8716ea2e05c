//! Wildcard patterns for token search
//!
//! A pattern is compiled once per query into a `Matcher`. `*` matches
//! any run of characters and `?` exactly one; everything else is literal.

use crate::error::PatternError;
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::fmt::Debug;

/// How a pattern is compared with a token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub case_sensitive: bool,
    /// Match anywhere in the token instead of the whole token
    pub substring: bool,
}

/// Compiled form of a search pattern
#[derive(Clone)]
pub enum Matcher {
    /// Empty pattern: every token matches
    All,
    /// Pattern without wildcards; `text` is lower-cased unless
    /// `case_sensitive`
    Literal {
        text: String,
        substring: bool,
        case_sensitive: bool,
    },
    /// Pattern string + compiled regex
    Pattern(String, Regex),
}

// Manual Debug implementation
impl Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Matcher::All => f.write_str("All"),
            Matcher::Literal {
                text,
                substring,
                case_sensitive,
            } => f
                .debug_struct("Literal")
                .field("text", text)
                .field("substring", substring)
                .field("case_sensitive", case_sensitive)
                .finish(),
            Matcher::Pattern(pattern, _) => f.debug_tuple("Pattern").field(pattern).finish(),
        }
    }
}

// Manual PartialEq implementation (compare pattern strings, not compiled regex)
impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Matcher::All, Matcher::All) => true,
            (
                Matcher::Literal {
                    text,
                    substring,
                    case_sensitive,
                },
                Matcher::Literal {
                    text: t,
                    substring: s,
                    case_sensitive: c,
                },
            ) => text == t && substring == s && case_sensitive == c,
            (Matcher::Pattern(a, _), Matcher::Pattern(b, _)) => a == b,
            _ => false,
        }
    }
}

impl Matcher {
    /// Compile a user pattern. Leading and trailing whitespace is ignored.
    pub fn compile(pattern: &str, options: MatchOptions) -> Result<Self, PatternError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(Matcher::All);
        }

        if !pattern.contains(['*', '?']) {
            let text = if options.case_sensitive {
                pattern.to_string()
            } else {
                pattern.to_lowercase()
            };
            return Ok(Matcher::Literal {
                text,
                substring: options.substring,
                case_sensitive: options.case_sensitive,
            });
        }

        let body = wildcard_to_regex(pattern);
        let source = if options.substring {
            body
        } else {
            format!("^(?:{body})$")
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(!options.case_sensitive)
            .build()
            .map_err(|source| PatternError {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Matcher::Pattern(source, regex))
    }

    /// Test a raw token attribute; case folding follows the options the
    /// matcher was compiled with
    #[inline]
    pub fn is_match(&self, subject: &str) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Literal {
                text,
                substring,
                case_sensitive,
            } => {
                let subject = if *case_sensitive {
                    Cow::Borrowed(subject)
                } else {
                    Cow::Owned(subject.to_lowercase())
                };
                if *substring {
                    subject.contains(text.as_str())
                } else {
                    *subject == **text
                }
            }
            Matcher::Pattern(_, regex) => regex.is_match(subject),
        }
    }

    pub fn matches_everything(&self) -> bool {
        matches!(self, Matcher::All)
    }
}

/// Escape regex syntax, then turn the escaped `*` and `?` back into
/// wildcards
fn wildcard_to_regex(pattern: &str) -> String {
    regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".")
}
