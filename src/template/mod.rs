//! # Template Module
//!
//! Compiles URI path templates such as `/accounts/{id: \d+}/files/{name}.{ext}` into
//! regex matchers and exposes the metrics used to order competing templates.
//!
//! ## Syntax
//!
//! - Literal text matches itself. Characters outside the URI path grammar are
//!   percent-encoded before matching, so `/a b` matches a request for `/a%20b`.
//! - `{name}` captures one or more characters other than `/`.
//! - `{name: regex}` captures using `regex` verbatim, which may span `/` for
//!   catch-all variables (`{rest: .*}`).
//! - Literal text sharing a segment with a variable (`file.{ext}`) stays a fixed
//!   prefix/suffix of the capture.
//!
//! Templates are normalised to start with `/`; a trailing `/` is dropped.
//!
//! ## Prefix matching
//!
//! The compiled pattern is `^<template>(/.*)?$`: a template matches a path when it
//! consumes either the whole path or a prefix ending at a `/`. What is left over is
//! returned as the remainder, which sub-resource locators hand on to their delegate.
//!
//! ## Specificity
//!
//! [`PathTemplate::cmp_specificity`] orders templates so the most specific sorts first:
//!
//! 1. more literal characters,
//! 2. then fewer template variables,
//! 3. then more explicit regexes.
//!
//! Templates equal under all three compare `Equal`; callers keep registration order
//! for those by sorting stably.

mod parser;
#[cfg(test)]
mod tests;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use regex::Regex;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::{TemplateErrorKind, TemplateSyntaxError};

pub use parser::{TemplatePart, TemplateVariable};

/// Maximum number of captured variables before heap allocation.
/// Most templates have ≤4 variables (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured variable storage: `(name, decoded value)` pairs in template order.
///
/// Names are `Arc<str>` shared with the compiled template so capturing only
/// allocates the values.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Kind of one `/`-delimited template segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Only literal text
    Literal,
    /// At least one variable, none with an explicit regex
    Variable,
    /// At least one variable with an explicit regex
    RegexVariable,
}

/// One `/`-delimited segment of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Segment text as written (variables included)
    pub raw: String,
    /// What the segment contains
    pub kind: SegmentKind,
}

/// Result of matching a path against one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    /// Captured variables, percent-decoded
    pub params: ParamVec,
    /// Unconsumed path suffix: empty, or starting with `/`
    pub remainder: String,
}

/// A compiled URI path template.
///
/// Immutable once compiled. Equality and hashing are structural: two templates are
/// equal when their literal layout and variable arity are identical, regardless of
/// variable names or regexes.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    template: String,
    normalized: String,
    parts: Vec<TemplatePart>,
    segments: Vec<Segment>,
    regex_source: String,
    pattern: Regex,
    remainder_group: usize,
    literal_chars: usize,
    variable_count: usize,
    explicit_regexes: usize,
}

impl PathTemplate {
    /// Compile a template string.
    ///
    /// # Errors
    ///
    /// [`TemplateSyntaxError`] when the template is empty, braces are unbalanced,
    /// a variable name is empty, illegal or duplicated, or an explicit regex does
    /// not compile.
    pub fn compile(template: &str) -> Result<Self, TemplateSyntaxError> {
        let trimmed = template.trim();
        if trimmed.is_empty() {
            return Err(TemplateSyntaxError::new(template, TemplateErrorKind::Empty));
        }

        let normalized_input = normalize(trimmed);
        let parsed = parser::parse(template, &normalized_input)?;

        let remainder_group = parsed.group_count + 1;
        // The root template consumes nothing; the whole path is its remainder.
        let body = if normalized_input == "/" {
            ""
        } else {
            parsed.regex_source.as_str()
        };
        let full = format!("^{body}(/.*)?$");
        // Every piece was validated on its own, so this only fails on engine limits.
        let pattern = Regex::new(&full).map_err(|e| {
            TemplateSyntaxError::new(
                template,
                TemplateErrorKind::InvalidRegex {
                    name: String::new(),
                    message: e.to_string(),
                },
            )
        })?;

        let variable_count = parsed
            .parts
            .iter()
            .filter(|p| matches!(p, TemplatePart::Variable(_)))
            .count();
        let segments = split_segments(&parsed.parts);

        debug!(
            template = %normalized_input,
            regex = %full,
            variables = variable_count,
            explicit_regexes = parsed.explicit_regexes,
            "Compiled path template"
        );

        Ok(Self {
            template: normalized_input,
            normalized: parsed.normalized,
            parts: parsed.parts,
            segments,
            regex_source: parsed.regex_source,
            pattern,
            remainder_group,
            literal_chars: parsed.literal_chars,
            variable_count,
            explicit_regexes: parsed.explicit_regexes,
        })
    }

    /// The template text (normalised: leading `/`, no trailing `/`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Template with every variable replaced by `{}`; the structural identity.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// The compiled prefix-matching pattern.
    #[must_use]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Parsed literal/variable pieces in order.
    #[must_use]
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// `/`-delimited segments (the leading empty segment is omitted).
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Declared variables in template order.
    pub fn variables(&self) -> impl Iterator<Item = &TemplateVariable> {
        self.parts.iter().filter_map(|p| match p {
            TemplatePart::Variable(v) => Some(v),
            TemplatePart::Literal(_) => None,
        })
    }

    /// Whether the template declares a variable called `name`.
    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables().any(|v| v.name() == name)
    }

    #[must_use]
    pub fn number_of_template_variables(&self) -> usize {
        self.variable_count
    }

    #[must_use]
    pub fn number_of_explicit_regexes(&self) -> usize {
        self.explicit_regexes
    }

    #[must_use]
    pub fn number_of_literal_characters(&self) -> usize {
        self.literal_chars
    }

    /// True when both templates match exactly the same set of paths: same literal
    /// layout, same arity and the same per-variable regexes.
    #[must_use]
    pub fn matches_same_paths(&self, other: &PathTemplate) -> bool {
        self.regex_source == other.regex_source
    }

    /// Match `path` (percent-encoded, `/`-delimited) against this template.
    ///
    /// Succeeds when the template consumes the whole path or a prefix ending at a
    /// `/`; the unconsumed suffix is returned as the remainder.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<TemplateMatch> {
        let captures = self.pattern.captures(path)?;

        let params = self
            .variables()
            .filter_map(|v| {
                captures
                    .get(v.group)
                    .map(|m| (Arc::clone(&v.name), decode(m.as_str())))
            })
            .collect();
        let remainder = captures
            .get(self.remainder_group)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Some(TemplateMatch { params, remainder })
    }

    /// Order by specificity; `Less` means `self` is more specific.
    #[must_use]
    pub fn cmp_specificity(&self, other: &PathTemplate) -> Ordering {
        other
            .literal_chars
            .cmp(&self.literal_chars)
            .then_with(|| self.variable_count.cmp(&other.variable_count))
            .then_with(|| other.explicit_regexes.cmp(&self.explicit_regexes))
    }

    /// Substitute variable values to build a concrete path.
    ///
    /// Values are percent-encoded. For variables with an explicit regex, `/` is kept
    /// so catch-all variables can span segments. Returns `None` if `lookup` has no
    /// value for some variable.
    pub fn expand<'v, F>(&self, mut lookup: F) -> Option<String>
    where
        F: FnMut(&str) -> Option<&'v str>,
    {
        let mut out = String::with_capacity(self.template.len());
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Variable(var) => {
                    let value = lookup(var.name())?;
                    if var.regex.is_some() {
                        let encoded: Vec<_> = value.split('/').map(urlencoding::encode).collect();
                        out.push_str(&encoded.join("/"));
                    } else {
                        out.push_str(&urlencoding::encode(value));
                    }
                }
            }
        }
        Some(out)
    }
}

impl PartialEq for PathTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for PathTemplate {}

impl Hash for PathTemplate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

impl std::str::FromStr for PathTemplate {
    type Err = TemplateSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathTemplate::compile(s)
    }
}

/// Leading `/` added, a single trailing `/` removed (the root stays `/`).
pub(crate) fn normalize(template: &str) -> String {
    let mut t = if template.starts_with('/') {
        template.to_string()
    } else {
        format!("/{template}")
    };
    if t.len() > 1 && t.ends_with('/') {
        t.pop();
    }
    t
}

/// Percent-decode a captured value, keeping it raw if it is not valid UTF-8.
fn decode(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

fn split_segments(parts: &[TemplatePart]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut raw = String::new();
    let mut kind = SegmentKind::Literal;
    let mut started = false;

    for part in parts {
        match part {
            TemplatePart::Literal(text) => {
                for c in text.chars() {
                    if c == '/' {
                        if started {
                            segments.push(Segment {
                                raw: std::mem::take(&mut raw),
                                kind,
                            });
                        }
                        kind = SegmentKind::Literal;
                        started = true;
                    } else {
                        raw.push(c);
                    }
                }
            }
            TemplatePart::Variable(var) => {
                match var.regex() {
                    Some(r) => {
                        raw.push_str(&format!("{{{}: {}}}", var.name(), r));
                        kind = SegmentKind::RegexVariable;
                    }
                    None => {
                        raw.push_str(&format!("{{{}}}", var.name()));
                        if kind == SegmentKind::Literal {
                            kind = SegmentKind::Variable;
                        }
                    }
                }
                started = true;
            }
        }
    }
    if started && !(raw.is_empty() && kind == SegmentKind::Literal && segments.is_empty()) {
        segments.push(Segment { raw, kind });
    }
    segments
}
