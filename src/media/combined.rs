use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;

use super::accept::MediaTypeRange;
use super::media_type::{MediaType, Quality};

/// The pairing of a client range with a server-declared type, scored for ranking.
///
/// Ordering (`Ord`) is "greater is better":
///
/// 1. specificity of the combined type (concrete > `type/*` > `*/*`),
/// 2. client quality `q`,
/// 3. server quality source `qs`,
/// 4. fewer wildcards that had to be resolved by the pairing (`distance`).
///
/// Equality is equality of rank: two pairings that differ only in `combined`
/// compare equal. Compare `combined` directly to tell them apart.
#[derive(Debug, Clone)]
pub struct CombinedMediaType {
    /// The more specific of the two types, quality parameters stripped
    pub combined: MediaType,
    pub q: Quality,
    pub qs: Quality,
    /// Count of type/subtype positions where exactly one side was a wildcard
    pub distance: u8,
}

impl CombinedMediaType {
    /// Combine a client range with a server type, or `None` if incompatible.
    #[must_use]
    pub fn combine(client: &MediaTypeRange, server: &MediaType) -> Option<Self> {
        let client_type = &client.media_type;
        if !client_type.is_compatible(server) {
            return None;
        }
        let stripped_server = server.without_quality_params();
        let distance = u8::from(client_type.is_wildcard_type() ^ server.is_wildcard_type())
            + u8::from(client_type.is_wildcard_subtype() ^ server.is_wildcard_subtype());

        Some(Self {
            combined: client_type.most_specific(&stripped_server).clone(),
            q: client.quality,
            qs: server.quality_source(),
            distance,
        })
    }
}

impl Ord for CombinedMediaType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.combined
            .specificity()
            .cmp(&other.combined.specificity())
            .then_with(|| self.q.cmp(&other.q))
            .then_with(|| self.qs.cmp(&other.qs))
            .then_with(|| other.distance.cmp(&self.distance))
    }
}

impl PartialEq for CombinedMediaType {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for CombinedMediaType {}

impl PartialOrd for CombinedMediaType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CombinedMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};q={};qs={};d={}", self.combined, self.q, self.qs, self.distance)
    }
}

static ANY_PRODUCES: Lazy<[MediaType; 1]> = Lazy::new(|| [MediaType::wildcard()]);

/// Best pairing of the client's `accept` ranges with the declared `produces` list.
///
/// An empty `produces` list is treated as `*/*`. For each declared type, the most
/// specific compatible client range decides whether it is acceptable at all: if
/// that range has `q=0` the type is excluded even when a broader range accepts it
/// (`*/*, application/xml;q=0` rejects XML).
#[must_use]
pub fn best_match(accept: &[MediaTypeRange], produces: &[MediaType]) -> Option<CombinedMediaType> {
    let produces = if produces.is_empty() {
        &ANY_PRODUCES[..]
    } else {
        produces
    };

    produces
        .iter()
        .filter(|server| !excluded(accept, server))
        .flat_map(|server| {
            accept
                .iter()
                .filter(|range| !range.quality.is_zero())
                .filter_map(move |range| CombinedMediaType::combine(range, server))
        })
        .fold(None, |best: Option<CombinedMediaType>, candidate| match best {
            Some(b) if b >= candidate => Some(b),
            _ => Some(candidate),
        })
}

fn excluded(accept: &[MediaTypeRange], server: &MediaType) -> bool {
    // A wildcard server type is only excluded when nothing at all is acceptable.
    if server.is_wildcard() {
        return accept.iter().all(|r| r.quality.is_zero());
    }
    accept
        .iter()
        .filter(|r| r.media_type.is_compatible(server))
        .fold(None, |best: Option<&MediaTypeRange>, r| match best {
            Some(b) if b.media_type.cmp_specificity(&r.media_type) != Ordering::Greater => Some(b),
            _ => Some(r),
        })
        .is_some_and(|r| r.quality.is_zero())
}

/// Whether a request `Content-Type` is acceptable to a `consumes` list.
/// An empty list accepts anything.
#[must_use]
pub fn consumes(content_type: &MediaType, declared: &[MediaType]) -> bool {
    declared.is_empty() || declared.iter().any(|d| d.is_compatible(content_type))
}
