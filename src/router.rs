//! The router contract definitions are compiled against, and `RouteTable`, an
//! in-memory router that records what was registered.

use serde::Serialize;

use crate::error::RouteError;
use crate::group::GroupOptions;
use crate::table::{HandlerTarget, Verb};

/// Callback re-entered by [`Router::group`] and [`Router::domain`] with the
/// group context active.
pub type GroupRoutes<'a> = &'a mut dyn FnMut(&mut dyn Router) -> Result<(), RouteError>;

/// Handle to a freshly registered route.
pub trait Route {
    fn middleware(&mut self, middleware: &[String]) -> &mut dyn Route;
    fn name(&mut self, name: &str) -> &mut dyn Route;
}

pub trait Router {
    fn route(&mut self, verb: Verb, uri: &str, action: HandlerTarget) -> &mut dyn Route;

    fn match_any(&mut self, verbs: &[Verb], uri: &str, action: HandlerTarget) -> &mut dyn Route;

    fn group(&mut self, options: &GroupOptions, routes: GroupRoutes<'_>) -> Result<(), RouteError>;

    /// Like [`Router::group`], constrained to `options.domain`.
    fn domain(&mut self, options: &GroupOptions, routes: GroupRoutes<'_>)
    -> Result<(), RouteError>;

    /// Catch-all route matched when nothing else does.
    fn fallback(&mut self, action: HandlerTarget) -> &mut dyn Route;
}

pub const FALLBACK_URI: &str = "{fallbackPlaceholder}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredRoute {
    pub methods: Vec<Verb>,
    pub uri: String,
    pub action: HandlerTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub middleware: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip)]
    name_prefix: String,
}

impl Route for RegisteredRoute {
    fn middleware(&mut self, middleware: &[String]) -> &mut dyn Route {
        self.middleware.extend(middleware.iter().cloned());
        self
    }

    fn name(&mut self, name: &str) -> &mut dyn Route {
        let joined = match self.name.take() {
            Some(existing) => format!("{existing}{name}"),
            None => format!("{}{name}", self.name_prefix),
        };
        self.name = Some(joined);
        self
    }
}

/// Recording router: routes are kept in registration order, enclosing groups
/// contribute their prefix, name prefix, middleware, namespace and domain.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RegisteredRoute>,
    stack: Vec<GroupOptions>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&RegisteredRoute> {
        self.routes.iter().find(|r| r.name.as_deref() == Some(name))
    }

    pub(crate) fn enter(&mut self, options: &GroupOptions) {
        self.stack.push(options.clone());
    }

    pub(crate) fn leave(&mut self) {
        self.stack.pop();
    }

    pub(crate) fn push(
        &mut self,
        methods: Vec<Verb>,
        uri: &str,
        action: HandlerTarget,
    ) -> &mut RegisteredRoute {
        let route = RegisteredRoute {
            methods,
            uri: self.full_uri(uri),
            action: self.qualify(action),
            name: None,
            middleware: self
                .stack
                .iter()
                .flat_map(|g| g.middleware.iter().cloned())
                .collect(),
            domain: self.stack.iter().rev().find_map(|g| g.domain.clone()),
            name_prefix: self.stack.iter().filter_map(|g| g.name.as_deref()).collect(),
        };
        self.routes.push(route);
        let last = self.routes.len() - 1;
        &mut self.routes[last]
    }

    fn full_uri(&self, uri: &str) -> String {
        let segments: Vec<&str> = self
            .stack
            .iter()
            .filter_map(|g| g.prefix.as_deref())
            .chain(std::iter::once(uri))
            .flat_map(|part| part.split('/'))
            .filter(|s| !s.is_empty())
            .collect();
        format!("/{}", segments.join("/"))
    }

    fn qualify(&self, action: HandlerTarget) -> HandlerTarget {
        if let Some(absolute) = action.controller.strip_prefix("::") {
            return HandlerTarget::new(absolute, action.action);
        }
        let namespace: Vec<&str> = self
            .stack
            .iter()
            .filter_map(|g| g.namespace.as_deref())
            .map(|ns| ns.trim_matches(':'))
            .filter(|ns| !ns.is_empty())
            .collect();
        if namespace.is_empty() {
            return action;
        }
        HandlerTarget::new(
            format!("{}::{}", namespace.join("::"), action.controller),
            action.action,
        )
    }
}

impl Router for RouteTable {
    fn route(&mut self, verb: Verb, uri: &str, action: HandlerTarget) -> &mut dyn Route {
        self.push(vec![verb], uri, action)
    }

    fn match_any(&mut self, verbs: &[Verb], uri: &str, action: HandlerTarget) -> &mut dyn Route {
        self.push(verbs.to_vec(), uri, action)
    }

    fn group(&mut self, options: &GroupOptions, routes: GroupRoutes<'_>) -> Result<(), RouteError> {
        self.enter(options);
        let result = routes(self);
        self.leave();
        result
    }

    fn domain(
        &mut self,
        options: &GroupOptions,
        routes: GroupRoutes<'_>,
    ) -> Result<(), RouteError> {
        self.group(options, routes)
    }

    fn fallback(&mut self, action: HandlerTarget) -> &mut dyn Route {
        self.push(Verb::ALL.to_vec(), FALLBACK_URI, action)
    }
}

/// Router wrapper for tests that need to see the primitive calls themselves,
/// not only their outcome. Middleware and name arguments are held on a tap
/// and applied to the recorded route before the next primitive call.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Route(Verb, String),
        Match(Vec<Verb>, String),
        Name(String),
        Group(GroupOptions),
        Domain(GroupOptions),
        Fallback,
    }

    #[derive(Debug, Default)]
    pub(crate) struct Tap {
        middleware: Vec<Vec<String>>,
        names: Vec<String>,
    }

    impl Route for Tap {
        fn middleware(&mut self, middleware: &[String]) -> &mut dyn Route {
            self.middleware.push(middleware.to_vec());
            self
        }

        fn name(&mut self, name: &str) -> &mut dyn Route {
            self.names.push(name.to_string());
            self
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingRouter {
        pub(crate) calls: Vec<Call>,
        table: RouteTable,
        tap: Tap,
    }

    impl RecordingRouter {
        pub(crate) fn registrations(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Route(..) | Call::Match(..) | Call::Fallback))
                .count()
        }

        /// Names passed to `Route::name`, in call order.
        pub(crate) fn names(&mut self) -> Vec<String> {
            self.flush();
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Name(name) => Some(name.clone()),
                    _ => None,
                })
                .collect()
        }

        pub(crate) fn table(&mut self) -> &RouteTable {
            self.flush();
            &self.table
        }

        fn flush(&mut self) {
            let tap = std::mem::take(&mut self.tap);
            let Some(route) = self.table.routes.last_mut() else {
                return;
            };
            for middleware in &tap.middleware {
                route.middleware(middleware);
            }
            for name in tap.names {
                route.name(&name);
                self.calls.push(Call::Name(name));
            }
        }

        fn register(
            &mut self,
            call: Call,
            methods: Vec<Verb>,
            uri: &str,
            action: HandlerTarget,
        ) -> &mut dyn Route {
            self.flush();
            self.calls.push(call);
            self.table.push(methods, uri, action);
            &mut self.tap
        }

        fn wrap(
            &mut self,
            call: Call,
            options: &GroupOptions,
            routes: GroupRoutes<'_>,
        ) -> Result<(), RouteError> {
            self.flush();
            self.calls.push(call);
            self.table.enter(options);
            let result = routes(self);
            self.flush();
            self.table.leave();
            result
        }
    }

    impl Router for RecordingRouter {
        fn route(&mut self, verb: Verb, uri: &str, action: HandlerTarget) -> &mut dyn Route {
            self.register(Call::Route(verb, uri.to_string()), vec![verb], uri, action)
        }

        fn match_any(&mut self, verbs: &[Verb], uri: &str, action: HandlerTarget) -> &mut dyn Route {
            let call = Call::Match(verbs.to_vec(), uri.to_string());
            self.register(call, verbs.to_vec(), uri, action)
        }

        fn group(&mut self, options: &GroupOptions, routes: GroupRoutes<'_>) -> Result<(), RouteError> {
            self.wrap(Call::Group(options.clone()), options, routes)
        }

        fn domain(
            &mut self,
            options: &GroupOptions,
            routes: GroupRoutes<'_>,
        ) -> Result<(), RouteError> {
            self.wrap(Call::Domain(options.clone()), options, routes)
        }

        fn fallback(&mut self, action: HandlerTarget) -> &mut dyn Route {
            self.register(Call::Fallback, Verb::ALL.to_vec(), FALLBACK_URI, action)
        }
    }
}
