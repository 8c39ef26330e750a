use std::collections::HashSet;
use std::fmt;

use super::media_type::{split_unquoted, MediaType, Quality};
use crate::error::MediaTypeSyntaxError;

/// One element of an `Accept` header: a media range with its client quality.
///
/// The `q` parameter is lifted out of the parameter map into [`quality`](Self::quality).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeRange {
    pub media_type: MediaType,
    pub quality: Quality,
}

impl MediaTypeRange {
    #[must_use]
    pub fn new(media_type: MediaType, quality: Quality) -> Self {
        Self {
            media_type,
            quality,
        }
    }

    /// `*/*` at quality 1.0: what a missing `Accept` header means.
    #[must_use]
    pub fn any() -> Self {
        Self::new(MediaType::wildcard(), Quality::DEFAULT)
    }

    /// Parse a single range such as `text/html;level=1;q=0.7`.
    ///
    /// # Errors
    ///
    /// [`MediaTypeSyntaxError`] on malformed type/subtype tokens. An unparseable
    /// `q` is not an error: it defaults to 1.0.
    pub fn parse(value: &str) -> Result<Self, MediaTypeSyntaxError> {
        let media_type = MediaType::parse(value)?;
        let quality = media_type
            .param("q")
            .map_or(Quality::DEFAULT, Quality::parse_lenient);
        Ok(Self::new(media_type.without_quality_params(), quality))
    }
}

impl fmt::Display for MediaTypeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quality == Quality::DEFAULT {
            write!(f, "{}", self.media_type)
        } else {
            write!(f, "{};q={}", self.media_type, self.quality)
        }
    }
}

/// Parse an `Accept` header into ranges ordered by preference.
///
/// Ordering is by quality (highest first), then specificity (concrete before
/// `type/*` before `*/*`), then parameter count; equal ranges keep header order.
/// An absent or blank header yields a single `*/*`. Empty list elements
/// (`text/html,,`) are skipped.
///
/// # Errors
///
/// [`MediaTypeSyntaxError`] if any element has malformed type/subtype tokens.
pub fn parse_ranges(header: &str) -> Result<Vec<MediaTypeRange>, MediaTypeSyntaxError> {
    let mut ranges = split_unquoted(header, ',')
        .into_iter()
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .map(MediaTypeRange::parse)
        .collect::<Result<Vec<_>, _>>()?;

    if ranges.is_empty() {
        ranges.push(MediaTypeRange::any());
    }

    ranges.sort_by(|a, b| {
        b.quality
            .cmp(&a.quality)
            .then_with(|| a.media_type.cmp_specificity(&b.media_type))
    });
    Ok(ranges)
}

/// Parse a list of declared media types (a route's `consumes` or `produces`),
/// ordered most specific first. Each element may itself be a comma-separated list.
///
/// # Errors
///
/// [`MediaTypeSyntaxError`] on the first malformed entry.
pub fn parse_media_types<I, S>(declared: I) -> Result<Vec<MediaType>, MediaTypeSyntaxError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut types = Vec::new();
    for item in declared {
        for element in split_unquoted(item.as_ref(), ',') {
            let element = element.trim();
            if !element.is_empty() {
                types.push(MediaType::parse(element)?);
            }
        }
    }
    let mut seen = HashSet::new();
    types.retain(|t| seen.insert(t.clone()));
    types.sort_by(MediaType::cmp_specificity);
    Ok(types)
}
