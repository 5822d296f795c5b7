//! Group and domain wrapping around a definition's compiled routes.

use serde::Serialize;
use tracing::debug;

use crate::compiler;
use crate::config::Settings;
use crate::definition::{RouteDefinition, RouteOptions};
use crate::error::RouteError;
use crate::router::Router;

/// Options handed to the router's grouping primitives. Absent keys are left
/// out entirely, both here and in the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub middleware: Vec<String>,
    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl GroupOptions {
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

impl From<&RouteOptions> for GroupOptions {
    fn from(options: &RouteOptions) -> Self {
        Self {
            middleware: options.middleware.clone(),
            name: options.name.clone(),
            namespace: options.namespace.clone(),
            prefix: options.prefix.clone(),
            domain: None,
        }
    }
}

/// Runs the definition inside exactly one outer wrapper: the domain primitive
/// when a domain is declared, the plain group primitive otherwise.
///
/// Returns the number of routes registered inside the wrapper.
pub fn wrap(
    definition: &dyn RouteDefinition,
    options: &RouteOptions,
    router: &mut dyn Router,
    settings: &Settings,
) -> Result<usize, RouteError> {
    let group = GroupOptions::from(options);
    let mut registered = 0usize;
    let mut routes = |router: &mut dyn Router| -> Result<(), RouteError> {
        registered = compiler::run(definition, router, settings)?;
        Ok(())
    };

    match options.domain.as_deref() {
        Some(domain) => {
            debug!(definition = definition.label(), domain, "wrapping routes in domain group");
            router.domain(&group.with_domain(domain), &mut routes)?;
        }
        None => {
            debug!(definition = definition.label(), "wrapping routes in group");
            router.group(&group, &mut routes)?;
        }
    }

    Ok(registered)
}
