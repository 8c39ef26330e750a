use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::resolver::LocatorExpander;
use crate::router::{ParamVec, RouteDefinition, RouteEntry, RouteTable, Router};
use crate::runtime_config::RouterConfig;

/// Declarative route configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub config: RouterConfig,
    /// Top-level routes
    #[serde(default)]
    pub routes: Vec<RouteDefinition>,
    /// Named delegate route sets, reached through locators' `resource:`
    #[serde(default)]
    pub resources: BTreeMap<String, Vec<RouteDefinition>>,
}

impl Manifest {
    /// Register every route and wire locators to their resources.
    ///
    /// # Errors
    ///
    /// - a route fails to register (see [`RouteTable::register`])
    /// - a locator has no `resource:` or names one that is not declared
    pub fn build(&self) -> anyhow::Result<Router> {
        let mut tables = HashMap::with_capacity(self.resources.len());
        for (name, routes) in &self.resources {
            self.check_locators(routes)
                .with_context(|| format!("in resource '{name}'"))?;
            let table = RouteTable::from_definitions(routes.iter().cloned())
                .with_context(|| format!("failed to register routes of resource '{name}'"))?;
            debug!(resource = %name, routes_count = table.len(), "Resource routes registered");
            tables.insert(name.clone(), Arc::new(table));
        }

        self.check_locators(&self.routes)?;
        let top = RouteTable::from_definitions(self.routes.iter().cloned())
            .context("failed to register top-level routes")?;

        info!(
            routes_count = top.len(),
            resources_count = tables.len(),
            max_locator_depth = self.config.max_locator_depth,
            "Manifest built"
        );
        Ok(Router::new(top)
            .with_config(self.config)
            .with_expander(ManifestExpander { tables }))
    }

    fn check_locators(&self, routes: &[RouteDefinition]) -> anyhow::Result<()> {
        for route in routes.iter().filter(|r| r.locator) {
            let Some(resource) = &route.resource else {
                bail!(
                    "locator '{}' at '{}' does not name a resource",
                    route.handler,
                    route.path
                );
            };
            if !self.resources.contains_key(resource) {
                bail!(
                    "locator '{}' at '{}' refers to unknown resource '{resource}'",
                    route.handler,
                    route.path
                );
            }
        }
        Ok(())
    }
}

/// Expands manifest locators to the route table of the resource they name.
#[derive(Debug, Clone, Default)]
pub struct ManifestExpander {
    tables: HashMap<String, Arc<RouteTable>>,
}

impl LocatorExpander for ManifestExpander {
    fn expand(&self, locator: &RouteEntry, _params: &ParamVec) -> anyhow::Result<Arc<RouteTable>> {
        let name = locator
            .resource
            .as_deref()
            .ok_or_else(|| anyhow!("locator '{}' does not name a resource", locator.handler))?;
        self.tables
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| anyhow!("unknown resource '{name}'"))
    }
}
