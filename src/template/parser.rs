//! Template string → parts + regex source.
//!
//! Literal text is percent-encoded where the URI grammar requires it and escaped for
//! the regex engine; hex digits of percent-escapes match case-insensitively. Each
//! variable becomes one capturing group. Explicit regexes are compiled on their own
//! first so syntax errors are attributed to the right variable and nested groups can
//! be skipped when mapping group indexes back to variables.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

use regex::Regex;

use crate::error::{TemplateErrorKind, TemplateSyntaxError};

/// Default pattern for `{name}`: one or more characters, no `/`.
pub(crate) const DEFAULT_VARIABLE_PATTERN: &str = "[^/]+";

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Fixed text, as written in the template (not encoded)
    Literal(String),
    /// A `{name}` or `{name: regex}` placeholder
    Variable(TemplateVariable),
}

/// A named placeholder within a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariable {
    pub(crate) name: Arc<str>,
    pub(crate) regex: Option<String>,
    /// Capture group index in the compiled pattern
    pub(crate) group: usize,
}

impl TemplateVariable {
    /// Variable name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit regex, if one was declared
    #[must_use]
    pub fn regex(&self) -> Option<&str> {
        self.regex.as_deref()
    }

    /// Effective regex (explicit or the default no-slash wildcard)
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_deref().unwrap_or(DEFAULT_VARIABLE_PATTERN)
    }
}

/// Output of [`parse`].
#[derive(Debug)]
pub(crate) struct Parsed {
    pub parts: Vec<TemplatePart>,
    pub regex_source: String,
    pub normalized: String,
    pub literal_chars: usize,
    pub explicit_regexes: usize,
    /// Total capturing groups emitted, nested ones included
    pub group_count: usize,
}

/// Parse a template that has already been normalised (leading `/`, no trailing `/`).
pub(crate) fn parse(original: &str, template: &str) -> Result<Parsed, TemplateSyntaxError> {
    let err = |kind| TemplateSyntaxError::new(original, kind);

    let mut parts = Vec::new();
    let mut regex_source = String::with_capacity(template.len() * 2);
    let mut normalized = String::with_capacity(template.len());
    let mut literal = String::new();
    let mut literal_chars = 0;
    let mut explicit_regexes = 0;
    let mut next_group = 1;
    let mut seen = HashSet::new();

    let mut chars = template.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                flush_literal(&mut literal, &mut parts, &mut regex_source, &mut normalized, &mut literal_chars);

                let (name, regex) = read_variable(&mut chars, offset).map_err(err)?;
                validate_name(&name, offset).map_err(err)?;
                if !seen.insert(name.clone()) {
                    return Err(err(TemplateErrorKind::DuplicateName(name)));
                }

                let nested = match &regex {
                    Some(r) => {
                        let compiled = Regex::new(r).map_err(|e| {
                            err(TemplateErrorKind::InvalidRegex {
                                name: name.clone(),
                                message: e.to_string(),
                            })
                        })?;
                        explicit_regexes += 1;
                        compiled.captures_len() - 1
                    }
                    None => 0,
                };

                regex_source.push('(');
                regex_source.push_str(regex.as_deref().unwrap_or(DEFAULT_VARIABLE_PATTERN));
                regex_source.push(')');
                normalized.push_str("{}");

                parts.push(TemplatePart::Variable(TemplateVariable {
                    name: Arc::from(name.as_str()),
                    regex,
                    group: next_group,
                }));
                next_group += 1 + nested;
            }
            '}' => return Err(err(TemplateErrorKind::UnbalancedBraces(offset))),
            _ => literal.push(c),
        }
    }
    flush_literal(&mut literal, &mut parts, &mut regex_source, &mut normalized, &mut literal_chars);

    Ok(Parsed {
        parts,
        regex_source,
        normalized,
        literal_chars,
        explicit_regexes,
        group_count: next_group - 1,
    })
}

fn flush_literal(
    literal: &mut String,
    parts: &mut Vec<TemplatePart>,
    regex_source: &mut String,
    normalized: &mut String,
    literal_chars: &mut usize,
) {
    if literal.is_empty() {
        return;
    }
    *literal_chars += literal.chars().count();
    normalized.push_str(literal);
    push_literal_regex(literal, regex_source);
    parts.push(TemplatePart::Literal(std::mem::take(literal)));
}

/// Reads `name` or `name: regex` up to the closing brace. The opening brace has
/// already been consumed. Braces inside the regex nest; `\` escapes the next char.
fn read_variable(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    open: usize,
) -> Result<(String, Option<String>), TemplateErrorKind> {
    let mut name = String::new();
    loop {
        match chars.next() {
            Some((_, '}')) => return Ok((name.trim().to_string(), None)),
            Some((_, ':')) => break,
            Some((_, '{')) | None => return Err(TemplateErrorKind::UnbalancedBraces(open)),
            Some((_, c)) => name.push(c),
        }
    }

    let name = name.trim().to_string();
    let mut regex = String::new();
    let mut depth = 0usize;
    loop {
        match chars.next() {
            Some((_, '\\')) => {
                regex.push('\\');
                match chars.next() {
                    Some((_, escaped)) => regex.push(escaped),
                    None => return Err(TemplateErrorKind::UnbalancedBraces(open)),
                }
            }
            Some((_, '{')) => {
                depth += 1;
                regex.push('{');
            }
            Some((_, '}')) if depth == 0 => break,
            Some((_, '}')) => {
                depth -= 1;
                regex.push('}');
            }
            Some((_, c)) => regex.push(c),
            None => return Err(TemplateErrorKind::UnbalancedBraces(open)),
        }
    }

    let regex = regex.trim();
    if regex.is_empty() {
        return Err(TemplateErrorKind::EmptyRegex(name));
    }
    Ok((name, Some(regex.to_string())))
}

fn validate_name(name: &str, offset: usize) -> Result<(), TemplateErrorKind> {
    let mut chars = name.chars();
    let first = chars.next().ok_or(TemplateErrorKind::EmptyName(offset))?;
    if !(first.is_ascii_alphanumeric() || first == '_') {
        return Err(TemplateErrorKind::IllegalName {
            name: name.to_string(),
            ch: first,
        });
    }
    if let Some(ch) = chars.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))) {
        return Err(TemplateErrorKind::IllegalName {
            name: name.to_string(),
            ch,
        });
    }
    Ok(())
}

/// Characters that may appear unencoded in a path: unreserved, sub-delims, `:`, `@`, `/`.
pub(crate) fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '.' | '_' | '~' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';'
                | '=' | ':' | '@' | '/'
        )
}

fn push_literal_regex(literal: &str, out: &mut String) {
    let bytes = literal.as_bytes();
    let mut i = 0;
    while i < literal.len() {
        // Existing escapes are kept; only their hex case is relaxed.
        if bytes[i] == b'%'
            && i + 2 < literal.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let _ = write!(out, "(?i:%{}{})", bytes[i + 1] as char, bytes[i + 2] as char);
            i += 3;
            continue;
        }
        let Some(c) = literal[i..].chars().next() else {
            break;
        };
        if is_path_char(c) {
            let mut buf = [0u8; 4];
            out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
        } else {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "(?i:%{b:02X})");
            }
        }
        i += c.len_utf8();
    }
}
