//! # Negotiation Module
//!
//! Picks exactly one winner from the candidates a [`RouteTable`](crate::router::RouteTable)
//! produced for a path, or reports which stage ran out of candidates:
//!
//! 1. **Method**: keep entries that answer the request method. When enabled, a HEAD
//!    request for a path with no HEAD route is negotiated against the GET routes,
//!    and an OPTIONS request for a path with no OPTIONS route is answered
//!    automatically (see [`MatchResult::automatic_options`]). Nothing left is
//!    [`RoutingError::MethodNotAllowed`], carrying the methods declared for the path.
//! 2. **Consumes**: when the request has a `Content-Type`, keep entries whose
//!    `consumes` accepts it. Nothing left is [`RoutingError::UnsupportedMediaType`].
//! 3. **Produces**: score each entry's `produces` against `Accept`. Nothing
//!    acceptable is [`RoutingError::NotAcceptable`].
//! 4. **Tie-break**: among the best-scored entries, keep the incoming candidate
//!    order (template specificity, resource methods before locators, terminal
//!    before partial, registration order).
//!
//! Each stage only narrows the set; nothing is retried.


use http::Method;
use tracing::{debug, warn};

use crate::error::RoutingError;
use crate::media::{best_match, consumes, parse_ranges, CombinedMediaType, MediaType, MediaTypeRange};
use crate::router::{MatchResult, RequestDescriptor};
use crate::runtime_config::RouterConfig;

/// Parsed, per-request inputs to [`select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationRequest {
    pub method: Method,
    /// Request body type; `None` when the request has no body
    pub content_type: Option<MediaType>,
    /// Client preferences, best first; never empty
    pub accept: Vec<MediaTypeRange>,
    /// Treat GET routes as answering HEAD when no HEAD route exists
    pub head_falls_back_to_get: bool,
    /// Answer OPTIONS with the allowed methods when no OPTIONS route exists
    pub automatic_options: bool,
}

impl NegotiationRequest {
    /// Accepts anything, no body.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            content_type: None,
            accept: vec![MediaTypeRange::any()],
            head_falls_back_to_get: true,
            automatic_options: true,
        }
    }

    /// Parse the headers of a transport-level request. A blank `Content-Type`
    /// counts as absent; a missing or blank `Accept` means `*/*`.
    ///
    /// # Errors
    ///
    /// [`RoutingError::MediaType`] when either header has malformed type/subtype
    /// tokens.
    pub fn from_descriptor(
        request: &RequestDescriptor,
        config: &RouterConfig,
    ) -> Result<Self, RoutingError> {
        let content_type = request
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .map(MediaType::parse)
            .transpose()?
            .map(|ct| ct.without_quality_params());
        let accept = parse_ranges(request.accept.as_deref().unwrap_or_default())?;
        Ok(Self {
            method: request.method.clone(),
            content_type,
            accept,
            head_falls_back_to_get: config.head_falls_back_to_get,
            automatic_options: config.automatic_options,
        })
    }

    fn accept_header(&self) -> String {
        self.accept
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Choose the winning candidate. `candidates` must already be in template
/// specificity order, as [`RouteTable::candidates`](crate::router::RouteTable::candidates)
/// returns them.
///
/// The winner carries the negotiated media type and the method it was selected
/// under (GET for a HEAD fallback). An automatic OPTIONS answer skips the media
/// type stages and carries the allowed methods instead.
///
/// # Errors
///
/// [`RoutingError::MethodNotAllowed`], [`RoutingError::UnsupportedMediaType`] or
/// [`RoutingError::NotAcceptable`], named after the stage that emptied the set.
pub fn select(
    candidates: &[MatchResult],
    request: &NegotiationRequest,
) -> Result<MatchResult, RoutingError> {
    if let Some(options) = automatic_options(candidates, request) {
        return Ok(options);
    }
    let (by_method, effective) = filter_method(candidates, request)?;

    let by_consumes: Vec<&MatchResult> = match &request.content_type {
        Some(ct) => by_method
            .into_iter()
            .filter(|c| consumes(ct, &c.entry.consumes))
            .collect(),
        None => by_method,
    };
    if by_consumes.is_empty() {
        let content_type = request
            .content_type
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        debug!(
            method = %request.method,
            content_type = %content_type,
            "No route consumes request content type"
        );
        return Err(RoutingError::UnsupportedMediaType { content_type });
    }

    let scored: Vec<_> = by_consumes
        .into_iter()
        .filter_map(|c| best_match(&request.accept, &c.entry.produces).map(|m| (c, m)))
        .collect();

    // First best-scored candidate wins; candidate order already encodes the tie-break.
    let best = scored.iter().fold(
        None,
        |best: Option<&(&MatchResult, CombinedMediaType)>, item| match best {
            Some(b) if b.1 >= item.1 => Some(b),
            _ => Some(item),
        },
    );
    let Some((winner, media)) = best else {
        let accept = request.accept_header();
        debug!(
            method = %request.method,
            accept = %accept,
            "No route produces an acceptable type"
        );
        return Err(RoutingError::NotAcceptable { accept });
    };

    let tied: Vec<_> = scored
        .iter()
        .filter(|(c, m)| {
            m == media
                && m.combined == media.combined
                && c.is_locator() == winner.is_locator()
                && c.is_terminal() == winner.is_terminal()
                && c.entry.template.cmp_specificity(&winner.entry.template).is_eq()
        })
        .map(|(c, _)| c.entry.handler())
        .collect();
    if tied.len() > 1 {
        warn!(
            method = %request.method,
            template = %winner.entry.template,
            handlers = ?tied,
            selected = %winner.entry.handler,
            "Ambiguous resource method; using the first registered"
        );
    }

    let mut selected = (*winner).clone();
    selected.negotiated = Some(media.clone());
    selected.effective_method = Some(effective);
    Ok(selected)
}

/// Stage 1. Returns the surviving candidates and the method they were matched under.
fn filter_method<'a>(
    candidates: &'a [MatchResult],
    request: &NegotiationRequest,
) -> Result<(Vec<&'a MatchResult>, Method), RoutingError> {
    let matching = |method: &Method| -> Vec<&'a MatchResult> {
        candidates
            .iter()
            .filter(|c| c.entry.method.matches(method))
            .collect()
    };

    // Locators answer any method, so only an explicit HEAD route blocks the fallback.
    if request.method == Method::HEAD
        && request.head_falls_back_to_get
        && !declares(candidates, &Method::HEAD)
    {
        let as_get = matching(&Method::GET);
        if !as_get.is_empty() {
            debug!("HEAD request negotiated as GET");
            return Ok((as_get, Method::GET));
        }
    }

    let direct = matching(&request.method);
    if !direct.is_empty() {
        return Ok((direct, request.method.clone()));
    }

    let allowed = declared_methods(candidates);
    debug!(method = %request.method, allowed = ?allowed, "Method not allowed");
    Err(RoutingError::MethodNotAllowed {
        method: request.method.clone(),
        allowed,
    })
}

/// An OPTIONS request that no resource route answers, on a path where some
/// resource route declares a method, is answered by the router itself.
/// Locator-only paths are left to the delegate.
fn automatic_options(candidates: &[MatchResult], request: &NegotiationRequest) -> Option<MatchResult> {
    if request.method != Method::OPTIONS || !request.automatic_options {
        return None;
    }
    let mut resources = candidates.iter().filter(|c| !c.is_locator());
    if resources
        .clone()
        .any(|c| c.entry.method.matches(&Method::OPTIONS))
    {
        return None;
    }
    let first = resources.find(|c| c.entry.method.as_method().is_some())?;

    let allowed = allowed_methods(candidates, request.head_falls_back_to_get, true);
    debug!(allowed = ?allowed, "OPTIONS answered automatically");
    let mut selected = first.clone();
    selected.effective_method = Some(Method::OPTIONS);
    selected.automatic_options = Some(allowed);
    Some(selected)
}

fn declares(candidates: &[MatchResult], method: &Method) -> bool {
    candidates
        .iter()
        .any(|c| c.entry.method.as_method() == Some(method))
}

/// Methods explicitly declared by `candidates`, sorted and de-duplicated.
/// Locators and any-method routes contribute nothing.
#[must_use]
pub fn declared_methods(candidates: &[MatchResult]) -> Vec<Method> {
    let mut methods: Vec<Method> = candidates
        .iter()
        .filter_map(|c| c.entry.method.as_method().cloned())
        .collect();
    methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    methods.dedup();
    methods
}

/// The methods a client may use on the path: [`declared_methods`], plus HEAD
/// wherever GET is declared when `head` is set, plus OPTIONS when `options` is
/// set. Empty when nothing is declared.
#[must_use]
pub fn allowed_methods(candidates: &[MatchResult], head: bool, options: bool) -> Vec<Method> {
    let mut methods = declared_methods(candidates);
    if methods.is_empty() {
        return methods;
    }
    if head && methods.contains(&Method::GET) {
        methods.push(Method::HEAD);
    }
    if options {
        methods.push(Method::OPTIONS);
    }
    methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    methods.dedup();
    methods
}
