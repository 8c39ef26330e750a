use std::sync::Arc;

use tracing::{debug, error, info};

use super::core::MatchResult;
use super::entry::{HandlerKind, MethodSpec, RouteDefinition, RouteEntry};
use super::index::SegmentIndex;
use crate::error::{RegistrationError, RoutingError};
use crate::media::parse_media_types;
use crate::template::PathTemplate;

/// Registered routes that share one compiled template.
#[derive(Debug, Clone)]
struct TemplateGroup {
    template: Arc<PathTemplate>,
    /// Indexes into `RouteTable::entries`, registration order
    entries: Vec<usize>,
}

/// A set of routes matched together: the application's top-level routes or the
/// routes of one sub-resource delegate.
///
/// Built once, then read-only. Registration validates each route and rejects it if
/// it would be ambiguous with one already present. Matching tries every template
/// whose first literal segment can match and returns the candidates ordered by
/// template specificity.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<Arc<RouteEntry>>,
    groups: Vec<TemplateGroup>,
    index: SegmentIndex,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from definitions, stopping at the first invalid one.
    ///
    /// # Errors
    ///
    /// The first [`RegistrationError`] encountered.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, RegistrationError>
    where
        I: IntoIterator<Item = RouteDefinition>,
    {
        let mut table = Self::new();
        for definition in definitions {
            table.register(definition)?;
        }
        info!(
            routes_count = table.len(),
            templates_count = table.groups.len(),
            indexed_segments = table.index.literal_buckets(),
            dynamic_templates = table.index.dynamic_len(),
            "Routing table loaded"
        );
        Ok(table)
    }

    /// Register one route.
    ///
    /// Locators always answer any method and carry no media type declarations.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Template`] for an invalid path template
    /// - [`RegistrationError::InvalidMethod`] for an unparseable method
    /// - [`RegistrationError::MediaType`] for a malformed consumes/produces entry
    /// - [`RegistrationError::UnknownVariable`] for a binding to an undeclared variable
    /// - [`RegistrationError::LocatorDeclaration`] for a locator with a method other
    ///   than `*`, or with consumes/produces entries
    /// - [`RegistrationError::AmbiguousRoute`] when an existing route matches the
    ///   same requests
    pub fn register(&mut self, definition: RouteDefinition) -> Result<Arc<RouteEntry>, RegistrationError> {
        match self.try_register(&definition) {
            Ok(entry) => {
                debug!(
                    method = %entry.method,
                    template = %entry.template,
                    handler = %entry.handler,
                    locator = entry.is_locator(),
                    order = entry.order,
                    "Route registered"
                );
                Ok(entry)
            }
            Err(e) => {
                error!(
                    path = %definition.path,
                    method = %definition.method,
                    handler = %definition.handler,
                    error = %e,
                    "Route registration failed"
                );
                Err(e)
            }
        }
    }

    /// Positional form of [`register`](Self::register).
    ///
    /// # Errors
    ///
    /// As for [`register`](Self::register).
    pub fn register_route(
        &mut self,
        template: &str,
        method: &str,
        consumes: &[&str],
        produces: &[&str],
        handler: &str,
        is_locator: bool,
    ) -> Result<Arc<RouteEntry>, RegistrationError> {
        let mut definition = RouteDefinition::new(template, handler)
            .method(method)
            .consumes(consumes.iter().copied())
            .produces(produces.iter().copied());
        definition.locator = is_locator;
        self.register(definition)
    }

    fn try_register(&mut self, definition: &RouteDefinition) -> Result<Arc<RouteEntry>, RegistrationError> {
        let kind = definition.kind();
        let template = PathTemplate::compile(&definition.path)?;

        let (method, consumes, produces) = match kind {
            HandlerKind::Locator => {
                let declaration = if MethodSpec::parse(&definition.method)? != MethodSpec::Any {
                    Some("a method")
                } else if !definition.consumes.is_empty() {
                    Some("consumes")
                } else if !definition.produces.is_empty() {
                    Some("produces")
                } else {
                    None
                };
                if let Some(declaration) = declaration {
                    return Err(RegistrationError::LocatorDeclaration {
                        handler: definition.handler.clone(),
                        template: template.as_str().to_string(),
                        declaration,
                    });
                }
                (MethodSpec::Any, Vec::new(), Vec::new())
            }
            HandlerKind::Resource => (
                MethodSpec::parse(&definition.method)?,
                parse_media_types(&definition.consumes)?,
                parse_media_types(&definition.produces)?,
            ),
        };

        if let Some(binding) = definition
            .parameters
            .iter()
            .find(|b| !template.has_variable(&b.variable))
        {
            return Err(RegistrationError::UnknownVariable {
                handler: definition.handler.clone(),
                parameter: binding.parameter.clone(),
                variable: binding.variable.clone(),
                template: template.as_str().to_string(),
            });
        }

        if let Some(existing) = self.entries.iter().find(|e| {
            e.kind == kind
                && e.template.matches_same_paths(&template)
                && e.method.overlaps(&method)
                && e.shares_media_types(&consumes, &produces)
        }) {
            return Err(RegistrationError::AmbiguousRoute {
                template: template.as_str().to_string(),
                method: method.to_string(),
                existing: existing.handler.to_string(),
                conflicting: definition.handler.clone(),
            });
        }

        let order = self.entries.len();
        let group = match self
            .groups
            .iter()
            .position(|g| g.template.as_str() == template.as_str())
        {
            Some(existing) => existing,
            None => {
                let group = self.groups.len();
                self.index.insert(&template, group);
                self.groups.push(TemplateGroup {
                    template: Arc::new(template),
                    entries: Vec::new(),
                });
                group
            }
        };

        let group = &mut self.groups[group];
        group.entries.push(order);
        let entry = Arc::new(RouteEntry {
            template: Arc::clone(&group.template),
            method,
            consumes,
            produces,
            handler: Arc::from(definition.handler.as_str()),
            kind,
            resource: definition.resource.as_deref().map(Arc::from),
            parameters: definition.parameters.clone(),
            order,
        });
        self.entries.push(Arc::clone(&entry));
        Ok(entry)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[Arc<RouteEntry>] {
        &self.entries
    }

    /// Distinct compiled templates in first-registration order.
    pub fn templates(&self) -> impl Iterator<Item = &Arc<PathTemplate>> {
        self.groups.iter().map(|g| &g.template)
    }

    /// Every route whose template matches `path`, most specific template first.
    ///
    /// A resource route is a candidate only when its template consumes the whole
    /// path (or the whole path but a trailing `/`, when `trailing_slash_tolerant`).
    /// A locator is a candidate for any prefix match ending at a `/` boundary.
    /// Equally specific templates list resource methods before locators, terminal
    /// matches before partial ones, then follow registration order.
    ///
    /// # Errors
    ///
    /// [`RoutingError::NotFound`] when no template yields a candidate.
    pub fn candidates(
        &self,
        path: &str,
        trailing_slash_tolerant: bool,
    ) -> Result<Vec<MatchResult>, RoutingError> {
        let mut found = Vec::new();
        for group in self.index.lookup(path).into_iter().filter_map(|g| self.groups.get(g)) {
            let Some(matched) = group.template.match_path(path) else {
                continue;
            };
            let terminal = matched.remainder.is_empty()
                || (matched.remainder == "/"
                    && (trailing_slash_tolerant || group.template.as_str() == "/"));

            for entry in group.entries.iter().filter_map(|&e| self.entries.get(e)) {
                if terminal || entry.is_locator() {
                    found.push(MatchResult::new(
                        Arc::clone(entry),
                        matched.params.clone(),
                        matched.remainder.clone(),
                        terminal,
                    ));
                }
            }
        }

        if found.is_empty() {
            return Err(RoutingError::NotFound {
                path: path.to_string(),
            });
        }

        found.sort_by(|a, b| {
            a.entry
                .template
                .cmp_specificity(&b.entry.template)
                .then_with(|| a.is_locator().cmp(&b.is_locator()))
                .then_with(|| b.is_terminal().cmp(&a.is_terminal()))
                .then_with(|| a.entry.order.cmp(&b.entry.order))
        });
        Ok(found)
    }

    /// Log every registered route at `info`.
    pub fn dump_routes(&self) {
        info!(routes_count = self.entries.len(), "Registered routes");
        for entry in &self.entries {
            info!(
                method = %entry.method,
                template = %entry.template,
                handler = %entry.handler,
                locator = entry.is_locator(),
                consumes = ?entry.consumes.iter().map(ToString::to_string).collect::<Vec<_>>(),
                produces = ?entry.produces.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "Route"
            );
        }
    }
}
