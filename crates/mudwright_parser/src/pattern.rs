//! Compiled command patterns.
//!
//! A pattern is a sequence of literal words and typed placeholders:
//!
//! - `look` - a literal word, matched case-insensitively
//! - `<thing>` - a placeholder bound through the default `word` filter
//! - `<object:thing>` - a placeholder bound through the `object` filter
//! - `<reason*>` - a raw-remainder placeholder consuming the rest of the
//!   line verbatim; only valid in final position
//!
//! Patterns are validated at registration time, never at match time.

use mudwright_foundation::{Error, Result};

/// The default filter applied to a bare `<name>` placeholder.
pub(crate) const DEFAULT_FILTER: &str = "word";

/// One token of a compiled pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternToken {
    /// A literal word that must match verbatim (case-insensitive).
    Literal(String),
    /// A typed placeholder consuming one word.
    Placeholder {
        /// The filter that resolves the word.
        filter: String,
        /// The name the resolved value is bound under.
        name: String,
    },
    /// A final placeholder consuming the rest of the line verbatim.
    Remainder {
        /// The name the remainder is bound under.
        name: String,
    },
}

/// A compiled command pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    tokens: Vec<PatternToken>,
}

impl Pattern {
    /// Compiles a pattern from its source text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PatternSyntax`] for an empty pattern, a malformed
    /// placeholder, a remainder placeholder that is not last, or a remainder
    /// placeholder that names a filter.
    pub fn compile(source: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        for word in source.split_whitespace() {
            if let Some(inner) = word.strip_prefix('<') {
                let Some(inner) = inner.strip_suffix('>') else {
                    return Err(Error::pattern(source, format!("unterminated placeholder {word:?}")));
                };
                tokens.push(Self::compile_placeholder(source, inner)?);
            } else if word.contains(['<', '>']) {
                return Err(Error::pattern(source, format!("stray angle bracket in {word:?}")));
            } else {
                tokens.push(PatternToken::Literal(word.to_lowercase()));
            }
        }
        if tokens.is_empty() {
            return Err(Error::pattern(source, "empty pattern"));
        }
        let last = tokens.len() - 1;
        for (position, token) in tokens.iter().enumerate() {
            if matches!(token, PatternToken::Remainder { .. }) && position != last {
                return Err(Error::pattern(
                    source,
                    "remainder placeholder must be the final token",
                ));
            }
        }
        Ok(Self {
            source: source.to_string(),
            tokens,
        })
    }

    fn compile_placeholder(source: &str, inner: &str) -> Result<PatternToken> {
        let (body, greedy) = match inner.strip_suffix('*') {
            Some(body) => (body, true),
            None => (inner, false),
        };
        let (filter, name) = match body.split_once(':') {
            Some((filter, name)) => (Some(filter), name),
            None => (None, body),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::pattern(source, format!("bad placeholder name {name:?}")));
        }
        if greedy {
            if filter.is_some() {
                return Err(Error::pattern(
                    source,
                    "remainder placeholder cannot name a filter",
                ));
            }
            return Ok(PatternToken::Remainder {
                name: name.to_string(),
            });
        }
        Ok(PatternToken::Placeholder {
            filter: filter.unwrap_or(DEFAULT_FILTER).to_string(),
            name: name.to_string(),
        })
    }

    /// Returns the pattern source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the compiled tokens.
    #[must_use]
    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Returns the leading literal word, if the pattern starts with one.
    #[must_use]
    pub fn leading_literal(&self) -> Option<&str> {
        match self.tokens.first() {
            Some(PatternToken::Literal(word)) => Some(word),
            _ => None,
        }
    }

    /// Iterates the filter names this pattern references.
    pub(crate) fn filters(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            PatternToken::Placeholder { filter, .. } => Some(filter.as_str()),
            _ => None,
        })
    }
}

/// A word of input with its byte offset, so a remainder placeholder can
/// recover the untokenized tail of the line.
#[derive(Clone, Copy, Debug)]
pub(crate) struct InputWord<'a> {
    pub start: usize,
    pub text: &'a str,
}

/// Splits a line on whitespace, remembering offsets.
pub(crate) fn tokenize(line: &str) -> Vec<InputWord<'_>> {
    let mut words = Vec::new();
    let mut start = None;
    for (index, ch) in line.char_indices() {
        if ch.is_whitespace() {
            if let Some(begin) = start.take() {
                words.push(InputWord {
                    start: begin,
                    text: &line[begin..index],
                });
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        words.push(InputWord {
            start: begin,
            text: &line[begin..],
        });
    }
    words
}
