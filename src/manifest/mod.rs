//! # Manifest Module
//!
//! Declarative route registration from a YAML, JSON or TOML file.
//!
//! ## Format
//!
//! ```yaml
//! config:
//!   max_locator_depth: 8
//! routes:
//!   - path: /items
//!     method: GET
//!     produces: [application/json, application/xml;qs=0.8]
//!     handler: list_items
//!   - path: '/items/{id: \d+}'
//!     method: GET
//!     handler: get_item
//!     parameters:
//!       - { parameter: item_id, variable: id }
//!   - path: /accounts/{id}
//!     handler: account
//!     locator: true
//!     resource: account
//! resources:
//!   account:
//!     - path: /transactions
//!       method: GET
//!       handler: list_transactions
//! ```
//!
//! - `routes` are registered into the top-level table.
//! - `resources` are named delegate route sets. A locator route names the set its
//!   delegate exposes through `resource:`; the [`ManifestExpander`] returned with
//!   the router resolves it.
//! - `config` overrides [`RouterConfig`](crate::runtime_config::RouterConfig)
//!   defaults; omitted fields keep their defaults.
//!
//! Unknown fields are rejected so typos surface at load time.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use resrouter::manifest::load_router;
//! use resrouter::router::RequestDescriptor;
//!
//! let router = load_router("routes.yaml")?;
//! let resolved = router.route(&RequestDescriptor::get("/accounts/7/transactions"))?;
//! assert_eq!(resolved.handler(), "list_transactions");
//! # Ok::<(), anyhow::Error>(())
//! ```

mod load;
mod types;
#[cfg(test)]
mod tests;

pub use load::{load_manifest, load_router, parse_manifest_str, ManifestFormat};
pub use types::{Manifest, ManifestExpander};
