//! # Resolver Module
//!
//! Drives a request through sub-resource locators until a terminal resource method
//! is selected.
//!
//! ## State machine
//!
//! ```text
//!            candidates            winner is a locator
//! Matching ────────────▶ Negotiating ─────────────────▶ Expanding
//!    ▲                        │                             │
//!    └────────────────────────┼─────── delegate routes ─────┘
//!                             │ winner is a resource
//!                             ▼
//!                          Terminal        (any stage error: Failed)
//! ```
//!
//! Expanding calls the [`LocatorExpander`] once with the locator entry and its
//! captured variables. The table it returns is matched against the unconsumed
//! remainder of the path (`/` if nothing is left). Each expansion counts against
//! [`RouterConfig::max_locator_depth`]; exceeding it ends in
//! [`RoutingError::LocatorCycle`].
//!
//! Errors from any stage are returned untouched. Routing is a deterministic
//! function of the registered routes and the request, so nothing is retried.


use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use http::Method;
use tracing::{debug, warn};

use crate::error::RoutingError;
use crate::media::MediaType;
use crate::negotiation::{self, NegotiationRequest};
use crate::router::{MatchResult, ParamVec, RouteEntry, RouteTable};
use crate::runtime_config::RouterConfig;

/// Produces the route table of a locator's delegate.
///
/// Implemented for any `Fn(&RouteEntry, &ParamVec) -> anyhow::Result<Arc<RouteTable>>`.
/// Called synchronously; the returned table is used as-is for the rest of the
/// request.
pub trait LocatorExpander: Send + Sync {
    /// # Errors
    ///
    /// Whatever prevented the delegate from being produced. Surfaces as
    /// [`RoutingError::LocatorExpansion`].
    fn expand(&self, locator: &RouteEntry, params: &ParamVec) -> anyhow::Result<Arc<RouteTable>>;
}

impl<F> LocatorExpander for F
where
    F: Fn(&RouteEntry, &ParamVec) -> anyhow::Result<Arc<RouteTable>> + Send + Sync,
{
    fn expand(&self, locator: &RouteEntry, params: &ParamVec) -> anyhow::Result<Arc<RouteTable>> {
        self(locator, params)
    }
}

/// Where a resolution currently is. See the module docs for the transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveState {
    Matching,
    Negotiating,
    Expanding,
    Terminal,
    Failed,
}

/// A successfully resolved request: the terminal match plus every locator that was
/// traversed to reach it, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub matched: MatchResult,
    pub locators: Vec<MatchResult>,
}

impl Resolution {
    #[must_use]
    pub fn handler(&self) -> &str {
        self.matched.entry.handler()
    }

    /// Number of locator expansions performed.
    #[must_use]
    pub fn expansions(&self) -> usize {
        self.locators.len()
    }

    /// Look up a captured variable. The terminal match is searched first, then
    /// locators from innermost to outermost.
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.matched.get_path_param(name).or_else(|| {
            self.locators
                .iter()
                .rev()
                .find_map(|l| l.get_path_param(name))
        })
    }

    /// All captured variables, outermost locator first, terminal match last.
    #[must_use]
    pub fn path_params(&self) -> ParamVec {
        self.locators
            .iter()
            .chain(std::iter::once(&self.matched))
            .flat_map(|m| m.params.iter().cloned())
            .collect()
    }

    /// Captured variables as a map; inner captures win over outer ones.
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[must_use]
    pub fn bound_parameters(&self) -> Vec<(&str, &str)> {
        self.matched.bound_parameters()
    }

    #[must_use]
    pub fn response_media_type(&self) -> Option<MediaType> {
        self.matched.response_media_type()
    }

    #[must_use]
    pub fn effective_method(&self) -> Option<&Method> {
        self.matched.effective_method()
    }

    /// See [`MatchResult::automatic_options`].
    #[must_use]
    pub fn automatic_options(&self) -> Option<&[Method]> {
        self.matched.automatic_options()
    }
}

/// One request's walk through locators.
pub struct SubResourceResolver<'a> {
    expander: Option<&'a dyn LocatorExpander>,
    config: RouterConfig,
    state: ResolveState,
}

impl<'a> SubResourceResolver<'a> {
    #[must_use]
    pub fn new(config: RouterConfig, expander: Option<&'a dyn LocatorExpander>) -> Self {
        Self {
            expander,
            config,
            state: ResolveState::Matching,
        }
    }

    #[must_use]
    pub fn state(&self) -> ResolveState {
        self.state
    }

    /// Match `path` against `table`, then resolve.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve); additionally [`RoutingError::NotFound`]
    /// from the top-level match.
    pub fn resolve_path(
        &mut self,
        table: &RouteTable,
        request: &NegotiationRequest,
        path: &str,
    ) -> Result<Resolution, RoutingError> {
        self.transition(ResolveState::Matching);
        match table.candidates(path, self.config.trailing_slash_tolerant) {
            Ok(candidates) => self.resolve(candidates, request, path),
            Err(e) => {
                self.transition(ResolveState::Failed);
                Err(e)
            }
        }
    }

    /// Resolve starting from top-level candidates already matched against `path`.
    ///
    /// # Errors
    ///
    /// - negotiation errors from any level ([`RoutingError::MethodNotAllowed`],
    ///   [`RoutingError::UnsupportedMediaType`], [`RoutingError::NotAcceptable`])
    /// - [`RoutingError::NotFound`] when a delegate has no route for the remainder
    /// - [`RoutingError::LocatorExpansion`] when the expander fails or none is set
    /// - [`RoutingError::LocatorCycle`] past the configured depth
    pub fn resolve(
        &mut self,
        initial: Vec<MatchResult>,
        request: &NegotiationRequest,
        path: &str,
    ) -> Result<Resolution, RoutingError> {
        let result = self.run(initial, request, path);
        if result.is_err() {
            self.transition(ResolveState::Failed);
        }
        result
    }

    fn run(
        &mut self,
        initial: Vec<MatchResult>,
        request: &NegotiationRequest,
        path: &str,
    ) -> Result<Resolution, RoutingError> {
        let mut candidates = initial;
        let mut locators: Vec<MatchResult> = Vec::new();

        loop {
            self.transition(ResolveState::Negotiating);
            let winner = negotiation::select(&candidates, request)?;

            if !winner.is_locator() {
                self.transition(ResolveState::Terminal);
                return Ok(Resolution {
                    matched: winner,
                    locators,
                });
            }

            if locators.len() >= self.config.max_locator_depth {
                warn!(
                    path = %path,
                    max_depth = self.config.max_locator_depth,
                    handler = %winner.entry.handler,
                    "Sub-resource locator depth exceeded"
                );
                return Err(RoutingError::LocatorCycle {
                    max_depth: self.config.max_locator_depth,
                    path: path.to_string(),
                });
            }

            self.transition(ResolveState::Expanding);
            let handler = winner.entry.handler.to_string();
            let expander = self.expander.ok_or_else(|| RoutingError::LocatorExpansion {
                handler: handler.clone(),
                source: anyhow!("no locator expander configured"),
            })?;
            let delegate = expander
                .expand(&winner.entry, &winner.params)
                .map_err(|source| RoutingError::LocatorExpansion {
                    handler: handler.clone(),
                    source,
                })?;

            let remainder = if winner.remainder.is_empty() {
                "/"
            } else {
                winner.remainder.as_str()
            };
            debug!(
                handler = %handler,
                remainder = %remainder,
                depth = locators.len() + 1,
                delegate_routes = delegate.len(),
                "Expanding sub-resource locator"
            );

            self.transition(ResolveState::Matching);
            candidates = delegate.candidates(remainder, self.config.trailing_slash_tolerant)?;
            locators.push(winner);
        }
    }

    fn transition(&mut self, next: ResolveState) {
        self.state = next;
    }
}
