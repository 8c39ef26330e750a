//! # Runtime Configuration Module
//!
//! Router behaviour that deployments may want to tune without code changes.
//!
//! ## Environment Variables
//!
//! ### `RESROUTER_MAX_LOCATOR_DEPTH`
//!
//! Maximum number of sub-resource locator expansions while resolving one request.
//! Guards against locators whose delegates lead back to themselves. Accepts decimal
//! or `0x`-prefixed hexadecimal.
//!
//! Default: `32`
//!
//! ### `RESROUTER_HEAD_FALLBACK`
//!
//! When `true`, a HEAD request with no HEAD route is negotiated against the GET
//! routes of the same path, and [`Router::allowed_methods`](crate::router::Router::allowed_methods)
//! lists HEAD wherever GET appears.
//!
//! Default: `true`
//!
//! ### `RESROUTER_AUTO_OPTIONS`
//!
//! When `true`, an OPTIONS request to a path with no OPTIONS route succeeds with
//! the path's allowed methods instead of failing as method-not-allowed.
//!
//! Default: `true`
//!
//! ### `RESROUTER_TRAILING_SLASH`
//!
//! When `true`, `/items/` selects the resource registered at `/items`.
//!
//! Default: `true`
//!
//! ## Usage
//!
//! ```rust
//! use resrouter::runtime_config::RouterConfig;
//!
//! let config = RouterConfig::from_env();
//! assert!(config.max_locator_depth > 0);
//! ```
//!
//! A manifest may also carry a `config:` block with the same field names; see
//! [`crate::manifest`].

use std::env;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_LOCATOR_DEPTH: usize = 32;

/// Router configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Locator expansions allowed per request (default: 32)
    pub max_locator_depth: usize,
    /// Negotiate HEAD as GET when no HEAD route exists (default: true)
    pub head_falls_back_to_get: bool,
    /// Answer OPTIONS automatically when no OPTIONS route exists (default: true)
    pub automatic_options: bool,
    /// Accept a single trailing `/` on resource paths (default: true)
    pub trailing_slash_tolerant: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_locator_depth: DEFAULT_MAX_LOCATOR_DEPTH,
            head_falls_back_to_get: true,
            automatic_options: true,
            trailing_slash_tolerant: true,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables. Unset or unparseable
    /// values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let max_locator_depth = match lookup("RESROUTER_MAX_LOCATOR_DEPTH") {
            Some(val) => {
                let val = val.trim();
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(defaults.max_locator_depth)
                } else {
                    val.parse().unwrap_or(defaults.max_locator_depth)
                }
            }
            None => defaults.max_locator_depth,
        };
        RouterConfig {
            max_locator_depth,
            head_falls_back_to_get: lookup("RESROUTER_HEAD_FALLBACK")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.head_falls_back_to_get),
            automatic_options: lookup("RESROUTER_AUTO_OPTIONS")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.automatic_options),
            trailing_slash_tolerant: lookup("RESROUTER_TRAILING_SLASH")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.trailing_slash_tolerant),
        }
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
