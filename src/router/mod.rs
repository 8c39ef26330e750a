//! # Router Module
//!
//! Route registration and path matching, plus the [`Router`] that ties matching,
//! negotiation and locator resolution together for one request.
//!
//! ## Overview
//!
//! - [`RouteDefinition`] is registration input, typed or from a manifest.
//! - [`RouteTable`] validates definitions into [`RouteEntry`] values and matches
//!   paths against them, producing ordered [`MatchResult`] candidates.
//! - [`Router`] wraps a table with its [`RouterConfig`](crate::runtime_config::RouterConfig)
//!   and an optional [`LocatorExpander`](crate::resolver::LocatorExpander), and
//!   routes a [`RequestDescriptor`] to a [`Resolution`](crate::resolver::Resolution).
//!
//! ## Architecture
//!
//! 1. **Registration**: each path is compiled into a
//!    [`PathTemplate`](crate::template::PathTemplate). Routes with the same template
//!    text share one compiled template; templates whose first segment is plain
//!    literal text are indexed by that segment. A route that would be
//!    indistinguishable from an existing one is rejected.
//!
//! 2. **Matching**: the request path is tried against every template that could
//!    match it. Resource routes need the template to consume the whole path;
//!    locators match any prefix ending at `/` and hand the remainder on.
//!
//! ## Example
//!
//! ```rust
//! use resrouter::router::{RequestDescriptor, RouteDefinition, RouteTable, Router};
//!
//! let mut table = RouteTable::new();
//! table
//!     .register(RouteDefinition::new("/pets/{id}", "get_pet").method("GET"))
//!     .unwrap();
//!
//! let router = Router::new(table);
//! let resolved = router.route(&RequestDescriptor::get("/pets/123")).unwrap();
//! assert_eq!(resolved.handler(), "get_pet");
//! assert_eq!(resolved.get_path_param("id"), Some("123"));
//! ```

mod core;
mod entry;
mod index;
mod request;
mod table;
#[cfg(test)]
mod performance_tests;

pub use self::core::{MatchResult, Router};
pub use entry::{HandlerKind, MethodSpec, ParameterBinding, RouteDefinition, RouteEntry};
pub use request::RequestDescriptor;
pub use table::RouteTable;

pub use crate::template::{ParamVec, MAX_INLINE_PARAMS};
