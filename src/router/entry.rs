use std::fmt;
use std::sync::Arc;

use http::Method;
use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;
use crate::media::MediaType;
use crate::template::PathTemplate;

/// HTTP method a route answers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodSpec {
    /// Any method. Sub-resource locators always use this.
    Any,
    Method(Method),
}

impl MethodSpec {
    /// Parse a method name. `*`, `ANY` and the empty string mean [`MethodSpec::Any`];
    /// anything else is upper-cased and must be a valid HTTP method token.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::InvalidMethod`] for names that are not method tokens.
    pub fn parse(name: &str) -> Result<Self, RegistrationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed == "*" || trimmed.eq_ignore_ascii_case("any") {
            return Ok(MethodSpec::Any);
        }
        Method::from_bytes(trimmed.to_ascii_uppercase().as_bytes())
            .map(MethodSpec::Method)
            .map_err(|_| RegistrationError::InvalidMethod(name.to_string()))
    }

    /// Does a request with `method` match?
    #[must_use]
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            MethodSpec::Any => true,
            MethodSpec::Method(m) => m == method,
        }
    }

    /// Could some request satisfy both specs?
    #[must_use]
    pub fn overlaps(&self, other: &MethodSpec) -> bool {
        match (self, other) {
            (MethodSpec::Any, _) | (_, MethodSpec::Any) => true,
            (MethodSpec::Method(a), MethodSpec::Method(b)) => a == b,
        }
    }

    #[must_use]
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            MethodSpec::Any => None,
            MethodSpec::Method(m) => Some(m),
        }
    }
}

impl fmt::Display for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSpec::Any => f.write_str("*"),
            MethodSpec::Method(m) => f.write_str(m.as_str()),
        }
    }
}

/// Whether a matched handler answers the request or hands off to a delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// Terminal resource method
    Resource,
    /// Sub-resource locator; its delegate's routes continue matching the remainder
    Locator,
}

/// Feeds the path variable `variable` into the handler's formal parameter `parameter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterBinding {
    pub parameter: String,
    pub variable: String,
}

impl ParameterBinding {
    pub fn new(parameter: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            variable: variable.into(),
        }
    }
}

/// Route registration input, as supplied by the application layer or a manifest.
///
/// ```rust
/// use resrouter::router::RouteDefinition;
///
/// let def = RouteDefinition::new("/items/{id}", "get_item")
///     .method("GET")
///     .produces(["application/json"])
///     .bind("item_id", "id");
/// assert_eq!(def.parameters[0].variable, "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDefinition {
    pub path: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    pub handler: String,
    #[serde(default)]
    pub locator: bool,
    /// Name of the delegate resource a locator hands off to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterBinding>,
}

impl RouteDefinition {
    /// A resource route answering any method, with no media type declarations.
    pub fn new(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: String::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            handler: handler.into(),
            locator: false,
            resource: None,
            parameters: Vec::new(),
        }
    }

    /// A sub-resource locator route.
    pub fn locator(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            locator: true,
            ..Self::new(path, handler)
        }
    }

    #[must_use]
    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    #[must_use]
    pub fn consumes<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes.extend(types.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn produces<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces.extend(types.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn resource(mut self, name: &str) -> Self {
        self.resource = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn bind(mut self, parameter: &str, variable: &str) -> Self {
        self.parameters.push(ParameterBinding::new(parameter, variable));
        self
    }

    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        if self.locator {
            HandlerKind::Locator
        } else {
            HandlerKind::Resource
        }
    }
}

/// A registered route. Immutable once it is in a [`RouteTable`](super::RouteTable).
///
/// Entries with the same template text share one compiled [`PathTemplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub template: Arc<PathTemplate>,
    pub method: MethodSpec,
    /// Declared request types, most specific first; empty accepts anything
    pub consumes: Vec<MediaType>,
    /// Declared response types, most specific first; empty means `*/*`
    pub produces: Vec<MediaType>,
    pub handler: Arc<str>,
    pub kind: HandlerKind,
    pub resource: Option<Arc<str>>,
    pub parameters: Vec<ParameterBinding>,
    /// Registration sequence number within the owning table
    pub order: usize,
}

impl RouteEntry {
    #[must_use]
    pub fn is_locator(&self) -> bool {
        self.kind == HandlerKind::Locator
    }

    #[must_use]
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Both entries declare a type that is the same once `q`/`qs` are ignored.
    /// An empty list counts as `*/*`.
    pub(crate) fn shares_media_types(&self, consumes: &[MediaType], produces: &[MediaType]) -> bool {
        overlap(&self.consumes, consumes) && overlap(&self.produces, produces)
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.template, self.handler)?;
        if self.is_locator() {
            f.write_str(" (locator)")?;
        }
        Ok(())
    }
}

fn overlap(a: &[MediaType], b: &[MediaType]) -> bool {
    let any = [MediaType::wildcard()];
    let a = if a.is_empty() { &any[..] } else { a };
    let b = if b.is_empty() { &any[..] } else { b };
    a.iter().any(|x| {
        let x = x.without_quality_params();
        b.iter().any(|y| y.without_quality_params() == x)
    })
}
