//! # resrouter
//!
//! **resrouter** maps an incoming request (method, path, `Content-Type`, `Accept`)
//! to the handler that should serve it. It is the routing core of a REST-style
//! framework: URI templates, HTTP content negotiation and sub-resource locators.
//! It does not perform I/O or invoke handlers; hosts map the returned handler
//! name to their own code.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     Req[RequestDescriptor] --> Router
//!     Router --> Table[RouteTable]
//!     Table -->|candidates| Neg[negotiation::select]
//!     Neg -->|resource method| Res[Resolution]
//!     Neg -->|locator| Exp[LocatorExpander]
//!     Exp -->|delegate table + remainder| Router
//! ```
//!
//! ### Core Components
//!
//! - [`template`]: compiles `/accounts/{id: \d+}` style templates into regex
//!   matchers and orders them by specificity.
//! - [`media`]: media types, `Accept` ranges, quality values and the
//!   combined-media-type ranking used to pick a response type.
//! - [`router`]: route registration into a [`RouteTable`](router::RouteTable),
//!   path matching, and the [`Router`](router::Router) entry point.
//! - [`negotiation`]: narrows matched candidates by method, request type and
//!   acceptable response type.
//! - [`resolver`]: the sub-resource state machine that follows locators into
//!   delegate tables.
//! - [`shared`]: lock-free publication of rebuilt routers.
//! - [`manifest`] and [`hot_reload`]: declarative routes from YAML, JSON or TOML,
//!   optionally reloaded when the file changes.
//!
//! ### Request Flow
//!
//! 1. Every template that matches the path (or a prefix of it, for locators)
//!    yields a candidate; candidates are ordered most specific first.
//! 2. Negotiation filters candidates by method (405), `Content-Type` (415) and
//!    `Accept` (406), then picks the best.
//! 3. A resource method ends routing. A locator is expanded into its delegate's
//!    table and the unmatched remainder is routed there, up to
//!    [`RouterConfig::max_locator_depth`](runtime_config::RouterConfig) hops.
//!
//! ## Quick Start
//!
//! ```rust
//! use resrouter::router::{RequestDescriptor, RouteDefinition, RouteTable, Router};
//!
//! let table = RouteTable::from_definitions([
//!     RouteDefinition::new("/items", "list_items")
//!         .method("GET")
//!         .produces(["application/json", "application/xml"]),
//!     RouteDefinition::new("/items/{id}", "get_item").method("GET"),
//! ])?;
//! let router = Router::new(table);
//!
//! let resolved = router.route(
//!     &RequestDescriptor::get("/items").with_accept("application/xml"),
//! )?;
//! assert_eq!(resolved.handler(), "list_items");
//! assert_eq!(resolved.response_media_type().unwrap().essence(), "application/xml");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Errors
//!
//! Configuration problems surface at registration as
//! [`RegistrationError`](error::RegistrationError). Request-time outcomes are
//! [`RoutingError`](error::RoutingError) values that map onto HTTP statuses
//! (`404`, `405` with an `Allow` set, `415`, `406`).
//!
//! ## Configuration
//!
//! [`RouterConfig`](runtime_config::RouterConfig) is read from `RESROUTER_*`
//! environment variables or a manifest's `config:` block. Logging is plain
//! `tracing`; [`logging::init_logging`] installs a ready-made subscriber.

pub mod error;
pub mod hot_reload;
pub mod logging;
pub mod manifest;
pub mod media;
pub mod negotiation;
pub mod resolver;
pub mod router;
pub mod runtime_config;
pub mod shared;
pub mod template;

pub use error::{
    MediaTypeSyntaxError, RegistrationError, RoutingError, TemplateErrorKind, TemplateSyntaxError,
};
pub use manifest::{load_manifest, load_router, Manifest};
pub use media::{MediaType, MediaTypeRange};
pub use resolver::{LocatorExpander, Resolution};
pub use router::{MatchResult, RequestDescriptor, RouteDefinition, RouteTable, Router};
pub use runtime_config::RouterConfig;
pub use shared::SharedRouter;
pub use template::PathTemplate;
