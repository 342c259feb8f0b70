//! Placeholder lexer and variable scanner.
//!
//! A template body is split into a flat sequence of [`Segment`]s:
//!
//! - plain text between placeholders
//! - `{{name}}` variable placeholders
//! - `{{@name}}` resource embed placeholders
//! - an unterminated tail (an opening `{{` with no closing `}}`)
//!
//! Whitespace between the braces and the name is ignored, so `{{ name }}`
//! and `{{name}}` are the same placeholder. There is no nesting and no
//! escaping. The variable scanner and the renderer's variable phase share
//! this lexer so they agree on what counts as a variable placeholder.

use std::collections::HashSet;

pub(crate) const OPEN: &str = "{{";
pub(crate) const CLOSE: &str = "}}";
pub(crate) const EMBED_PREFIX: char = '@';

/// One lexical piece of a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text.
    Text(&'a str),

    /// `{{name}}`. `name` is trimmed and may be empty.
    Variable {
        /// Trimmed placeholder name
        name: &'a str,
        /// Full placeholder text including braces
        raw: &'a str,
    },

    /// `{{@name}}`. `name` is trimmed and may be empty.
    Embed {
        /// Trimmed resource name (without `@`)
        name: &'a str,
        /// Full placeholder text including braces
        raw: &'a str,
    },

    /// Everything from an opening `{{` that is never closed to the end of input.
    Unterminated(&'a str),
}

impl<'a> Segment<'a> {
    /// Returns the exact source text covered by this segment.
    #[must_use]
    pub const fn raw(&self) -> &'a str {
        match *self {
            Self::Text(text) | Self::Unterminated(text) => text,
            Self::Variable { raw, .. } | Self::Embed { raw, .. } => raw,
        }
    }
}

/// Iterator over the [`Segment`]s of a template body.
///
/// Created by [`segments`]. Concatenating the raw text of every segment
/// reproduces the input exactly.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let Some(start) = self.rest.find(OPEN) else {
            return Some(Segment::Text(std::mem::take(&mut self.rest)));
        };

        if start > 0 {
            let (text, rest) = self.rest.split_at(start);
            self.rest = rest;
            return Some(Segment::Text(text));
        }

        let Some(end) = self.rest[OPEN.len()..].find(CLOSE) else {
            return Some(Segment::Unterminated(std::mem::take(&mut self.rest)));
        };

        let inner_end = OPEN.len() + end;
        let (raw, rest) = self.rest.split_at(inner_end + CLOSE.len());
        let inner = raw[OPEN.len()..inner_end].trim();
        self.rest = rest;

        Some(match inner.strip_prefix(EMBED_PREFIX) {
            Some(name) => Segment::Embed {
                name: name.trim(),
                raw,
            },
            None => Segment::Variable { name: inner, raw },
        })
    }
}

/// Splits a template body into segments.
///
/// # Examples
///
/// ```
/// use mcp_insight_core::{Segment, segments};
///
/// let parts: Vec<_> = segments("Hi {{ name }}, see {{@docs}}").collect();
/// assert_eq!(parts[0], Segment::Text("Hi "));
/// assert_eq!(parts[1], Segment::Variable { name: "name", raw: "{{ name }}" });
/// assert_eq!(parts[3], Segment::Embed { name: "docs", raw: "{{@docs}}" });
/// ```
#[must_use]
pub const fn segments(body: &str) -> Segments<'_> {
    Segments { rest: body }
}

/// Extracts the distinct variable names of a template body.
///
/// Names are returned in first-occurrence order. Embed placeholders and
/// empty placeholders are skipped, and scanning stops at an unterminated
/// `{{`.
///
/// # Examples
///
/// ```
/// use mcp_insight_core::extract_variables;
///
/// assert_eq!(extract_variables("{{b}}{{a}}{{b}}"), ["b", "a"]);
/// assert_eq!(extract_variables("{{@model}} {{ task }}"), ["task"]);
/// assert!(extract_variables("{{ }} {{open").is_empty());
/// ```
#[must_use]
pub fn extract_variables(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut variables = Vec::new();

    for segment in segments(body) {
        if let Segment::Variable { name, .. } = segment
            && !name.is_empty()
            && seen.insert(name)
        {
            variables.push(name.to_string());
        }
    }

    variables
}
