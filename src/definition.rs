//! Route definitions: declarative options plus optional capabilities.
//!
//! A definition type implements [`RouteDefinition`] and opts into each extra
//! capability by implementing the capability trait and returning `Some(self)`
//! from the matching `as_*` accessor. The compiler only ever reaches them through
//! those accessors.

use crate::router::Route;
use crate::table::{ActionTable, HandlerTarget, Methods};

/// Declarative options of one definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOptions {
    /// Name prefix (`as`) of the group.
    pub name: Option<String>,
    pub prefix: Option<String>,
    /// Identifier placeholder used by member URLs, `{id}` when unset.
    pub parameter: Option<String>,
    pub middleware: Vec<String>,
    pub namespace: Option<String>,
    pub is_resource: bool,
    pub is_group: bool,
    pub domain: Option<String>,
    pub except: Vec<String>,
    pub only: Vec<String>,
    /// Overrides the configured name separator.
    pub separator: Option<String>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            name: None,
            prefix: None,
            parameter: None,
            middleware: Vec::new(),
            namespace: None,
            is_resource: true,
            is_group: true,
            domain: None,
            except: Vec::new(),
            only: Vec::new(),
            separator: None,
        }
    }
}

impl RouteOptions {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    pub fn middleware<I, S>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware = middleware.into_iter().map(Into::into).collect();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn resource(mut self, is_resource: bool) -> Self {
        self.is_resource = is_resource;
        self
    }

    pub fn group(mut self, is_group: bool) -> Self {
        self.is_group = is_group;
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn except<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except = unique(actions);
        self
    }

    pub fn only<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = unique(actions);
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Member URL placeholder: `{id}`, or the lower-cased parameter in braces.
    pub fn placeholder(&self) -> String {
        match self.parameter.as_deref() {
            Some(p) if !p.is_empty() => format!("{{{}}}", p.to_lowercase()),
            _ => "{id}".to_string(),
        }
    }
}

fn unique<I, S>(actions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for action in actions {
        let action = action.into();
        if !out.contains(&action) {
            out.push(action);
        }
    }
    out
}

pub trait RouteDefinition {
    fn options(&self) -> RouteOptions;

    /// Identifies the definition in logs and errors.
    fn label(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn as_custom_methods(&self) -> Option<&dyn CustomMethods> {
        None
    }

    fn as_custom_uris(&self) -> Option<&dyn CustomUris> {
        None
    }

    fn as_custom_names(&self) -> Option<&dyn CustomNames> {
        None
    }

    fn as_custom_mapping(&self) -> Option<&dyn CustomMapping> {
        None
    }

    fn as_middlewares(&self) -> Option<&dyn Middlewares> {
        None
    }

    fn as_default_controller(&self) -> Option<&dyn DefaultController> {
        None
    }

    fn as_post_process(&self) -> Option<&dyn PostProcess> {
        None
    }

    fn as_fallback(&self) -> Option<&dyn Fallback> {
        None
    }
}

/// Extra or overriding action -> verb(s) entries.
pub trait CustomMethods {
    fn methods(&self) -> ActionTable<Methods>;
}

/// Extra or overriding action -> URL template entries.
pub trait CustomUris {
    fn uris(&self) -> ActionTable<String>;
}

/// Route-name resolution; only consulted in resource mode.
pub trait CustomNames {
    fn name_for(&self, action: &str) -> String;
}

/// Handler class -> actions it serves. The first class listing an action wins.
pub trait CustomMapping {
    fn mapping(&self) -> Vec<(String, Vec<String>)>;
}

pub trait Middlewares {
    fn middlewares(&self) -> ActionTable<Vec<String>>;
}

pub trait DefaultController {
    fn controller(&self) -> String;
}

/// Called with every route right after it is registered and named.
pub trait PostProcess {
    fn collection(&self, route: &mut dyn Route);
}

pub trait Fallback {
    fn fallback(&self) -> HandlerTarget;
}

/// A plain resource served by one controller.
#[derive(Debug, Clone)]
pub struct Resource {
    controller: String,
    options: RouteOptions,
}

impl Resource {
    pub fn new(controller: impl Into<String>, options: RouteOptions) -> Self {
        Self {
            controller: controller.into(),
            options,
        }
    }
}

impl RouteDefinition for Resource {
    fn options(&self) -> RouteOptions {
        self.options.clone()
    }

    fn label(&self) -> &str {
        &self.controller
    }

    fn as_default_controller(&self) -> Option<&dyn DefaultController> {
        Some(self)
    }
}

impl DefaultController for Resource {
    fn controller(&self) -> String {
        self.controller.clone()
    }
}
