use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::MediaTypeSyntaxError;

pub const WILDCARD: &str = "*";

/// How much of a media type is a wildcard. Ordered from least to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    /// `*/*`
    Wildcard,
    /// `type/*`
    SubtypeWildcard,
    /// `type/subtype`
    Concrete,
}

/// A quality value in thousandths, `0..=1000` (RFC 7231 allows three decimals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u16);

impl Quality {
    pub const MIN: Quality = Quality(0);
    pub const MAX: Quality = Quality(1000);
    pub const DEFAULT: Quality = Quality::MAX;

    /// Build from thousandths, clamping to `0..=1000`.
    #[must_use]
    pub fn from_millis(millis: u16) -> Self {
        Quality(millis.min(1000))
    }

    /// Lenient parse for client-supplied values: non-numeric input gives the
    /// default 1.0, numeric input is clamped to `[0, 1]`.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(q) if q.is_finite() => {
                let clamped = q.clamp(0.0, 1.0);
                // clamp keeps this within 0..=1000
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                Quality((clamped * 1000.0).round() as u16)
            }
            _ => Quality::DEFAULT,
        }
    }

    #[must_use]
    pub fn millis(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / 1000.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::DEFAULT
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("{:.3}", self.as_f32());
        f.write_str(s.trim_end_matches('0').trim_end_matches('.'))
    }
}

/// A parsed media type: `type/subtype` plus parameters.
///
/// Type, subtype and parameter names are lower-cased; parameter values are kept as
/// written (unquoted).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    ty: String,
    subtype: String,
    params: BTreeMap<String, String>,
}

impl MediaType {
    /// Build from already-validated parts.
    #[must_use]
    pub fn new(ty: &str, subtype: &str) -> Self {
        Self {
            ty: ty.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params: BTreeMap::new(),
        }
    }

    /// `*/*`
    #[must_use]
    pub fn wildcard() -> Self {
        Self::new(WILDCARD, WILDCARD)
    }

    /// `application/octet-stream`
    #[must_use]
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Parse `type/subtype;param=value;...`.
    ///
    /// A bare `*` is read as `*/*`. Malformed parameters are ignored; only bad
    /// type/subtype tokens are errors.
    ///
    /// # Errors
    ///
    /// [`MediaTypeSyntaxError`] when type or subtype is missing or not a token, or
    /// when a wildcard type is paired with a concrete subtype (`*/json`).
    pub fn parse(value: &str) -> Result<Self, MediaTypeSyntaxError> {
        let mut pieces = split_unquoted(value, ';').into_iter();
        let essence = pieces.next().unwrap_or_default().trim();

        let (ty, subtype) = if essence == WILDCARD {
            (WILDCARD, WILDCARD)
        } else {
            let (ty, subtype) = essence
                .split_once('/')
                .ok_or_else(|| MediaTypeSyntaxError::new(value, "expected 'type/subtype'"))?;
            (ty.trim(), subtype.trim())
        };

        if !is_token(ty) {
            return Err(MediaTypeSyntaxError::new(value, format!("invalid type token '{ty}'")));
        }
        if !is_token(subtype) {
            return Err(MediaTypeSyntaxError::new(
                value,
                format!("invalid subtype token '{subtype}'"),
            ));
        }
        if ty == WILDCARD && subtype != WILDCARD {
            return Err(MediaTypeSyntaxError::new(
                value,
                "wildcard type requires a wildcard subtype",
            ));
        }

        let mut media = MediaType::new(ty, subtype);
        for raw in pieces {
            let Some((name, val)) = raw.split_once('=') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            if !is_token(&name) {
                continue;
            }
            media.params.insert(name, unquote(val.trim()));
        }
        Ok(media)
    }

    /// Type (`text` in `text/plain`), possibly `*`.
    #[must_use]
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Subtype (`plain` in `text/plain`), possibly `*`.
    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// `type/subtype` without parameters.
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.ty, self.subtype)
    }

    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Adds or replaces a parameter.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn is_wildcard_type(&self) -> bool {
        self.ty == WILDCARD
    }

    #[must_use]
    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == WILDCARD
    }

    /// True if either part is a wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.is_wildcard_type() || self.is_wildcard_subtype()
    }

    #[must_use]
    pub fn specificity(&self) -> Specificity {
        if self.is_wildcard_type() {
            Specificity::Wildcard
        } else if self.is_wildcard_subtype() {
            Specificity::SubtypeWildcard
        } else {
            Specificity::Concrete
        }
    }

    /// Types and subtypes each equal or wildcarded on either side.
    #[must_use]
    pub fn is_compatible(&self, other: &MediaType) -> bool {
        let types = self.ty == other.ty || self.is_wildcard_type() || other.is_wildcard_type();
        let subtypes = self.subtype == other.subtype
            || self.is_wildcard_subtype()
            || other.is_wildcard_subtype();
        types && subtypes
    }

    /// Server-side quality (`qs` parameter), default 1.0.
    #[must_use]
    pub fn quality_source(&self) -> Quality {
        self.param("qs").map_or(Quality::DEFAULT, Quality::parse_lenient)
    }

    /// Copy without the `q` and `qs` parameters.
    #[must_use]
    pub fn without_quality_params(&self) -> Self {
        let mut stripped = self.clone();
        stripped.params.remove("q");
        stripped.params.remove("qs");
        stripped
    }

    /// The more specific of two compatible types; `self` wins ties.
    #[must_use]
    pub fn most_specific<'a>(&'a self, other: &'a MediaType) -> &'a MediaType {
        if self.is_wildcard_type() && !other.is_wildcard_type() {
            return other;
        }
        if self.is_wildcard_subtype() && !other.is_wildcard_subtype() {
            return other;
        }
        if other.specificity() == self.specificity() && other.params.len() > self.params.len() {
            return other;
        }
        self
    }

    /// Partial order used for declaration lists: more specific first, then more
    /// parameters first.
    #[must_use]
    pub fn cmp_specificity(&self, other: &MediaType) -> Ordering {
        other
            .specificity()
            .cmp(&self.specificity())
            .then_with(|| other.params.len().cmp(&self.params.len()))
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::parse(s)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ty, self.subtype)?;
        for (name, value) in &self.params {
            if !value.is_empty() && is_token(value) {
                write!(f, ";{name}={value}")?;
            } else {
                write!(f, ";{name}=\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
            }
        }
        Ok(())
    }
}

/// RFC 7230 `token`: one or more `tchar`.
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(
                    c,
                    '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`'
                        | '|' | '~'
                )
        })
}

/// Split on `delim` outside double-quoted strings.
pub(crate) fn split_unquoted(s: &str, delim: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == delim && !in_quotes => {
                pieces.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&s[start..]);
    pieces
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
