//! # Error Module
//!
//! Errors are split by when they can happen:
//!
//! - **Configuration time** - [`TemplateSyntaxError`], [`MediaTypeSyntaxError`] raised
//!   while parsing declared media types, and [`RegistrationError`]. These surface while
//!   routes are registered and keep the offending route out of the table.
//! - **Request time** - [`RoutingError`]. These are ordinary outcomes of routing a
//!   request (404/405/415/406-shaped failures, locator cycles) and carry enough context
//!   for the transport layer to build a response. They are never retried.

use http::Method;
use thiserror::Error;

/// A URI template that could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid URI template '{template}': {kind}")]
pub struct TemplateSyntaxError {
    /// The template as it was supplied
    pub template: String,
    /// What was wrong with it
    pub kind: TemplateErrorKind,
}

impl TemplateSyntaxError {
    pub(crate) fn new(template: &str, kind: TemplateErrorKind) -> Self {
        Self {
            template: template.to_string(),
            kind,
        }
    }
}

/// Reason a URI template was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateErrorKind {
    #[error("template is empty")]
    Empty,
    /// A `{` without its `}` or a stray `}`; carries the byte offset
    #[error("unbalanced braces at offset {0}")]
    UnbalancedBraces(usize),
    #[error("empty variable name at offset {0}")]
    EmptyName(usize),
    #[error("illegal character '{ch}' in variable name '{name}'")]
    IllegalName { name: String, ch: char },
    #[error("variable '{0}' is declared more than once")]
    DuplicateName(String),
    #[error("empty regular expression for variable '{0}'")]
    EmptyRegex(String),
    #[error("invalid regular expression for variable '{name}': {message}")]
    InvalidRegex { name: String, message: String },
}

/// A media type (or `Accept` range) whose type/subtype tokens could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid media type '{value}': {reason}")]
pub struct MediaTypeSyntaxError {
    /// The offending header or declaration text
    pub value: String,
    /// Human readable reason
    pub reason: String,
}

impl MediaTypeSyntaxError {
    pub(crate) fn new(value: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Route registration failures. Fatal for the route being registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Template(#[from] TemplateSyntaxError),
    #[error(transparent)]
    MediaType(#[from] MediaTypeSyntaxError),
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
    /// A parameter binding refers to a variable the template does not declare
    #[error("parameter '{parameter}' of handler '{handler}' is bound to unknown variable '{variable}' in '{template}'")]
    UnknownVariable {
        handler: String,
        parameter: String,
        variable: String,
        template: String,
    },
    /// A locator declares a method or media types; locators answer any method and
    /// leave negotiation to their delegate
    #[error("locator '{handler}' at '{template}' must not declare {declaration}")]
    LocatorDeclaration {
        handler: String,
        template: String,
        declaration: &'static str,
    },
    /// Two routes would compete for the same request with no way to tell them apart
    #[error("ambiguous route {method} '{template}': handlers '{existing}' and '{conflicting}' match the same requests")]
    AmbiguousRoute {
        template: String,
        method: String,
        existing: String,
        conflicting: String,
    },
}

/// Request-time routing outcomes other than success.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// No registered template matches the path at all
    #[error("no route matches path '{path}'")]
    NotFound { path: String },
    /// The path matched, but not for this method
    #[error("method {method} not allowed; allowed: {}", join_methods(.allowed))]
    MethodNotAllowed { method: Method, allowed: Vec<Method> },
    /// No method-matched route consumes the request `Content-Type`
    #[error("unsupported media type '{content_type}'")]
    UnsupportedMediaType { content_type: String },
    /// No remaining route produces anything the client accepts
    #[error("no acceptable representation for '{accept}'")]
    NotAcceptable { accept: String },
    /// Locator expansion exceeded the configured depth
    #[error("sub-resource locator depth {max_depth} exceeded while resolving '{path}'")]
    LocatorCycle { max_depth: usize, path: String },
    /// `Accept` or `Content-Type` could not be parsed
    #[error(transparent)]
    MediaType(#[from] MediaTypeSyntaxError),
    /// The locator expander callback failed to produce a delegate route table
    #[error("sub-resource locator '{handler}' failed to expand")]
    LocatorExpansion {
        handler: String,
        #[source]
        source: anyhow::Error,
    },
}

impl RoutingError {
    /// Methods to advertise in an `Allow` header, if this is a method mismatch.
    #[must_use]
    pub fn allowed_methods(&self) -> Option<&[Method]> {
        match self {
            RoutingError::MethodNotAllowed { allowed, .. } => Some(allowed),
            _ => None,
        }
    }

    /// `Allow` header value (e.g. `GET, POST`) for a method mismatch.
    #[must_use]
    pub fn allow_header(&self) -> Option<String> {
        self.allowed_methods().map(join_methods)
    }

    /// True for the 404-shaped outcome.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, RoutingError::NotFound { .. })
    }
}

fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_header_lists_methods() {
        let err = RoutingError::MethodNotAllowed {
            method: Method::PUT,
            allowed: vec![Method::GET, Method::HEAD],
        };
        assert_eq!(err.allow_header().as_deref(), Some("GET, HEAD"));
        assert_eq!(
            err.to_string(),
            "method PUT not allowed; allowed: GET, HEAD"
        );
    }

    #[test]
    fn test_non_method_errors_have_no_allow_header() {
        let err = RoutingError::NotFound {
            path: "/missing".into(),
        };
        assert!(err.is_not_found());
        assert!(err.allow_header().is_none());
    }

    #[test]
    fn test_template_error_display() {
        let err = TemplateSyntaxError::new("/{id", TemplateErrorKind::UnbalancedBraces(1));
        assert_eq!(
            err.to_string(),
            "invalid URI template '/{id': unbalanced braces at offset 1"
        );
    }
}
