//! Pattern matching and replace helpers shared by InkPad components.
//!
//! Matching follows global, non-overlapping, left-to-right semantics. Literal
//! search terms are escaped before compilation, whole-word searches are
//! bracketed with word boundaries, and raw regex terms are compiled verbatim.
//! Every function here is pure: the same text, term and options always yield
//! the same result.

use std::ops::Range;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error conditions raised by the pattern matcher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Flags controlling how a search term is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatchOptions {
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub whole_word: bool,
    #[serde(default)]
    pub use_regex: bool,
}

impl MatchOptions {
    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }

    pub fn whole_word(mut self, value: bool) -> Self {
        self.whole_word = value;
        self
    }

    pub fn use_regex(mut self, value: bool) -> Self {
        self.use_regex = value;
        self
    }
}

/// Direction for iterative searches (`Find Next` / `Find Previous`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

/// A single match within a text.
///
/// `index` and `length` count chars from the start of the text; `bytes` is the
/// same span expressed as a byte range, suitable for slicing the haystack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub index: usize,
    pub length: usize,
    pub text: String,
    pub bytes: Range<usize>,
}

impl Occurrence {
    /// Char offset one past the last char of the match.
    pub fn end(&self) -> usize {
        self.index + self.length
    }

    /// Char range covered by the match.
    pub fn range(&self) -> Range<usize> {
        self.index..self.end()
    }
}

/// Captures the outcome of a counted `replace_all` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplaceAllOutcome {
    pub text: String,
    pub replacements: usize,
}

/// A search term compiled under a fixed set of options.
#[derive(Clone, Debug)]
pub struct SearchPattern {
    regex: Regex,
    options: MatchOptions,
}

impl SearchPattern {
    /// Compiles `search` according to `options`.
    pub fn new(search: &str, options: &MatchOptions) -> Result<Self, SearchError> {
        let regex = build_regex(search, options)?;
        Ok(Self {
            regex,
            options: *options,
        })
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Returns every non-empty, non-overlapping match in `text`, left to right.
    pub fn occurrences(&self, text: &str) -> Vec<Occurrence> {
        let mut occurrences = Vec::new();
        // Char offset of `last_byte`, advanced incrementally between matches.
        let mut last_byte = 0usize;
        let mut last_char = 0usize;
        for m in self.regex.find_iter(text) {
            if m.is_empty() {
                continue;
            }
            last_char += text[last_byte..m.start()].chars().count();
            last_byte = m.start();
            let length = m.as_str().chars().count();
            occurrences.push(Occurrence {
                index: last_char,
                length,
                text: m.as_str().to_string(),
                bytes: m.range(),
            });
        }
        occurrences
    }

    /// Replaces every match in a single left-to-right pass.
    pub fn replace_all(&self, text: &str, replacement: &str) -> ReplaceAllOutcome {
        let mut replacements = 0usize;
        let mut output = String::with_capacity(text.len());
        let mut last = 0usize;

        for caps in self.regex.captures_iter(text) {
            let Some(m) = caps.get(0) else {
                continue;
            };
            output.push_str(&text[last..m.start()]);
            if self.options.use_regex {
                caps.expand(replacement, &mut output);
            } else {
                output.push_str(replacement);
            }
            last = m.end();
            replacements += 1;
        }

        if replacements == 0 {
            return ReplaceAllOutcome {
                text: text.to_string(),
                replacements,
            };
        }
        output.push_str(&text[last..]);
        ReplaceAllOutcome {
            text: output,
            replacements,
        }
    }

    /// Checks whether the pattern matches exactly `span` of `haystack` and, if so,
    /// returns the replacement text for it.
    ///
    /// The match is anchored at `span.start` with the rest of the haystack still
    /// in view, so word boundaries see the surrounding text. Regex patterns
    /// expand group references; literal patterns return `replacement` unchanged.
    pub fn replacement_at(
        &self,
        haystack: &str,
        span: Range<usize>,
        replacement: &str,
    ) -> Option<String> {
        if span.is_empty() || span.end > haystack.len() || !haystack.is_char_boundary(span.start)
        {
            return None;
        }
        let caps = self.regex.captures_at(haystack, span.start)?;
        if caps.get(0)?.range() != span {
            return None;
        }
        if !self.options.use_regex {
            return Some(replacement.to_string());
        }
        let mut expanded = String::new();
        caps.expand(replacement, &mut expanded);
        Some(expanded)
    }
}

/// Finds all occurrences of `search` in `text`.
///
/// Empty `text` or `search` yields an empty list rather than an error.
pub fn find_occurrences(
    text: &str,
    search: &str,
    options: &MatchOptions,
) -> Result<Vec<Occurrence>, SearchError> {
    if text.is_empty() || search.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = SearchPattern::new(search, options)?;
    Ok(pattern.occurrences(text))
}

/// Replaces all occurrences of `search` in `text` with `replace`.
///
/// Returns `text` unchanged when `search` is empty.
pub fn replace_all(
    text: &str,
    search: &str,
    replace: &str,
    options: &MatchOptions,
) -> Result<String, SearchError> {
    replace_all_counted(text, search, replace, options).map(|outcome| outcome.text)
}

/// Same as [`replace_all`], also reporting how many replacements were made.
pub fn replace_all_counted(
    text: &str,
    search: &str,
    replace: &str,
    options: &MatchOptions,
) -> Result<ReplaceAllOutcome, SearchError> {
    if search.is_empty() {
        return Ok(ReplaceAllOutcome {
            text: text.to_string(),
            replacements: 0,
        });
    }
    let pattern = SearchPattern::new(search, options)?;
    Ok(pattern.replace_all(text, replace))
}

fn build_regex(search: &str, options: &MatchOptions) -> Result<Regex, SearchError> {
    let mut builder = RegexBuilder::new(&translate_pattern(search, options));
    builder.case_insensitive(!options.case_sensitive);
    builder
        .build()
        .map_err(|err| SearchError::InvalidPattern(err.to_string()))
}

fn translate_pattern(search: &str, options: &MatchOptions) -> String {
    if options.use_regex {
        // Raw patterns are used verbatim; whole-word bracketing does not apply.
        return search.to_string();
    }
    let escaped = regex::escape(search);
    // `\b` is Unicode-aware: accented letters count as word chars.
    if options.whole_word {
        format!(r"\b{escaped}\b")
    } else {
        escaped
    }
}
