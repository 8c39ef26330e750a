//! Router core module: candidate results and the request-facing [`Router`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use tracing::{debug, info, warn};

use super::entry::RouteEntry;
use super::request::RequestDescriptor;
use super::table::RouteTable;
use crate::error::RoutingError;
use crate::media::{CombinedMediaType, MediaType, Specificity};
use crate::negotiation::{self, NegotiationRequest};
use crate::resolver::{LocatorExpander, Resolution, SubResourceResolver};
use crate::runtime_config::RouterConfig;
use crate::template::ParamVec;

/// One route whose template matched a path.
///
/// Produced by [`RouteTable::candidates`] as a candidate; the winner of negotiation
/// additionally carries the negotiated media type and the method it was selected
/// under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub entry: Arc<RouteEntry>,
    /// Captured variables, percent-decoded, in template order
    pub params: ParamVec,
    /// Unconsumed path suffix: empty, or starting with `/`
    pub remainder: String,
    terminal: bool,
    pub(crate) negotiated: Option<CombinedMediaType>,
    pub(crate) effective_method: Option<Method>,
    pub(crate) automatic_options: Option<Vec<Method>>,
}

impl MatchResult {
    pub(crate) fn new(entry: Arc<RouteEntry>, params: ParamVec, remainder: String, terminal: bool) -> Self {
        Self {
            entry,
            params,
            remainder,
            terminal,
            negotiated: None,
            effective_method: None,
            automatic_options: None,
        }
    }

    #[must_use]
    pub fn handler(&self) -> &str {
        self.entry.handler()
    }

    #[must_use]
    pub fn is_locator(&self) -> bool {
        self.entry.is_locator()
    }

    /// The template consumed the whole path (a lone trailing `/` aside, when
    /// tolerated).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Get a captured variable by name.
    ///
    /// Uses "last write wins" semantics, matching [`path_params_map`](Self::path_params_map).
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert params to a HashMap.
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// `(parameter, value)` for every binding declared on the entry.
    #[must_use]
    pub fn bound_parameters(&self) -> Vec<(&str, &str)> {
        self.entry
            .parameters
            .iter()
            .filter_map(|b| {
                self.get_path_param(&b.variable)
                    .map(|value| (b.parameter.as_str(), value))
            })
            .collect()
    }

    /// The scored media type pairing, once negotiated.
    #[must_use]
    pub fn negotiated(&self) -> Option<&CombinedMediaType> {
        self.negotiated.as_ref()
    }

    /// Concrete type to write the response in.
    ///
    /// A negotiated `*/*` or `application/*` degrades to `application/octet-stream`;
    /// any other wildcard (say `text/*`) gives `None`, leaving the choice to the
    /// handler.
    #[must_use]
    pub fn response_media_type(&self) -> Option<MediaType> {
        let combined = &self.negotiated.as_ref()?.combined;
        match combined.specificity() {
            Specificity::Concrete => Some(combined.clone()),
            Specificity::Wildcard => Some(MediaType::octet_stream()),
            Specificity::SubtypeWildcard if combined.ty() == "application" => {
                Some(MediaType::octet_stream())
            }
            Specificity::SubtypeWildcard => None,
        }
    }

    /// Method the route was selected under: GET when a HEAD request fell back to a
    /// GET route, otherwise the request method. `None` before negotiation.
    #[must_use]
    pub fn effective_method(&self) -> Option<&Method> {
        self.effective_method.as_ref()
    }

    /// Set when an OPTIONS request was answered by the router because no route
    /// declares OPTIONS for the path: the methods to list in `Allow`. The entry is
    /// then only the path's most specific resource route and its handler should not
    /// be invoked.
    #[must_use]
    pub fn automatic_options(&self) -> Option<&[Method]> {
        self.automatic_options.as_deref()
    }
}

/// Request router: a route table plus configuration and the locator expander.
///
/// Cheap to clone; the table is shared. Publish a new `Router` (see
/// [`SharedRouter`](crate::shared::SharedRouter)) to change routes at runtime.
#[derive(Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    config: RouterConfig,
    expander: Option<Arc<dyn LocatorExpander>>,
}

impl Router {
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self::from_table(Arc::new(table))
    }

    #[must_use]
    pub fn from_table(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            config: RouterConfig::default(),
            expander: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_expander<E>(mut self, expander: E) -> Self
    where
        E: LocatorExpander + 'static,
    {
        self.expander = Some(Arc::new(expander));
        self
    }

    #[must_use]
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Path-only match; see [`RouteTable::candidates`].
    ///
    /// # Errors
    ///
    /// [`RoutingError::NotFound`] when nothing matches.
    pub fn candidates(&self, path: &str) -> Result<Vec<MatchResult>, RoutingError> {
        self.table
            .candidates(path, self.config.trailing_slash_tolerant)
    }

    /// Route a request using the configured expander.
    ///
    /// # Errors
    ///
    /// Any [`RoutingError`]; a locator win with no expander configured is
    /// [`RoutingError::LocatorExpansion`].
    pub fn route(&self, request: &RequestDescriptor) -> Result<Resolution, RoutingError> {
        self.route_inner(request, self.expander.as_deref())
    }

    /// Route a request with an explicit expander, ignoring the configured one.
    ///
    /// # Errors
    ///
    /// Any [`RoutingError`].
    pub fn route_with(
        &self,
        request: &RequestDescriptor,
        expander: &dyn LocatorExpander,
    ) -> Result<Resolution, RoutingError> {
        self.route_inner(request, Some(expander))
    }

    fn route_inner(
        &self,
        request: &RequestDescriptor,
        expander: Option<&dyn LocatorExpander>,
    ) -> Result<Resolution, RoutingError> {
        debug!(
            method = %request.method,
            path = %request.path,
            content_type = ?request.content_type,
            accept = ?request.accept,
            "Route match attempt"
        );
        let match_start = Instant::now();

        let negotiation_request =
            NegotiationRequest::from_descriptor(request, &self.config)?;
        let mut resolver = SubResourceResolver::new(self.config, expander);
        let result = resolver.resolve_path(&self.table, &negotiation_request, &request.path);

        let match_duration = match_start.elapsed();
        match &result {
            Ok(resolution) => {
                let media = resolution
                    .matched
                    .negotiated()
                    .map(|m| m.combined.to_string())
                    .unwrap_or_default();
                if match_duration > Duration::from_millis(1) {
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        handler_name = %resolution.handler(),
                        route_pattern = %resolution.matched.entry.template,
                        media_type = %media,
                        expansions = resolution.expansions(),
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    info!(
                        method = %request.method,
                        path = %request.path,
                        handler_name = %resolution.handler(),
                        route_pattern = %resolution.matched.entry.template,
                        media_type = %media,
                        expansions = resolution.expansions(),
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
            }
            Err(e) => {
                debug!(
                    method = %request.method,
                    path = %request.path,
                    error = %e,
                    duration_us = match_duration.as_micros(),
                    "No route matched"
                );
            }
        }
        result
    }

    /// Methods a client may use on `path` in the top-level table: the declared
    /// ones, HEAD wherever GET appears when HEAD fallback is on, and OPTIONS when
    /// automatic OPTIONS is on. Empty if nothing is declared for the path.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        self.candidates(path)
            .map(|c| {
                negotiation::allowed_methods(
                    &c,
                    self.config.head_falls_back_to_get,
                    self.config.automatic_options,
                )
            })
            .unwrap_or_default()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("config", &self.config)
            .field("expander", &self.expander.is_some())
            .finish()
    }
}
