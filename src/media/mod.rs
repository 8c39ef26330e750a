//! # Media Module
//!
//! Parses `Accept` / `Content-Type` values and scores declared media types against
//! them.
//!
//! ## Compatibility
//!
//! A declared type `P` is compatible with a requested range `R` when the types are
//! equal (or either is `*`) and the subtypes are equal (or either is `*`). The same
//! test applies to `Content-Type` against a route's `consumes` list, where there is
//! no quality dimension.
//!
//! ## Ranking
//!
//! Compatible pairs become a [`CombinedMediaType`]: the more specific of the two
//! types, plus the client's `q`, the server's `qs` and a wildcard distance. The best
//! pairing wins by (in order) combined specificity, `q`, `qs`, then smaller distance.
//!
//! Client input is parsed leniently: an unparseable `q` reads as 1.0 and malformed
//! parameters are dropped. Only broken `type/subtype` tokens are errors.

mod accept;
mod combined;
mod media_type;

pub use accept::{parse_media_types, parse_ranges, MediaTypeRange};
pub use combined::{best_match, consumes, CombinedMediaType};
pub use media_type::{MediaType, Quality, Specificity, WILDCARD};
