//! The route definition compiler.
//!
//! Assemble the method table and resolve the action filter, then resolve the
//! URL and handler of every permitted action before registering them with the
//! router in table order, with their middleware and names.

use tracing::{debug, trace};

use crate::config::Settings;
use crate::definition::{RouteDefinition, RouteOptions};
use crate::error::RouteError;
use crate::group;
use crate::router::Router;
use crate::table::{ActionTable, HandlerTarget, Methods, Verb};

/// The conventional resource actions, in registration order.
pub const RESOURCE_ACTIONS: [&str; 7] = [
    "index", "create", "store", "show", "update", "destroy", "edit",
];

/// Entry point for one definition: wrapped in a group (or domain group) when
/// the definition asks for one, registered directly otherwise.
///
/// Returns the number of routes registered.
pub fn routes(
    definition: &dyn RouteDefinition,
    router: &mut dyn Router,
    settings: &Settings,
) -> Result<usize, RouteError> {
    let options = definition.options();
    check_filters(definition, &options)?;

    if is_wrapped(&options) {
        return group::wrap(definition, &options, router, settings);
    }
    run(definition, router, settings)
}

/// Whether the definition's routes run inside an outer group or domain group.
pub fn is_wrapped(options: &RouteOptions) -> bool {
    options.is_group || options.domain.is_some()
}

/// Compiles and registers every permitted action of `definition`.
pub fn run(
    definition: &dyn RouteDefinition,
    router: &mut dyn Router,
    settings: &Settings,
) -> Result<usize, RouteError> {
    let options = definition.options();
    let separator = options
        .separator
        .clone()
        .unwrap_or_else(|| settings.separator.clone());

    let methods = method_table(definition, &options);
    let filter = ActionFilter::resolve(definition, &options, &methods)?;
    let uris = uri_table(definition, &options);
    let middlewares = definition
        .as_middlewares()
        .map(|m| m.middlewares())
        .unwrap_or_default();

    // Resolve everything first so a bad action leaves no partial registrations.
    let mut planned = Vec::new();
    for (action, verbs) in methods.iter() {
        if !filter.permits(action) {
            trace!(definition = definition.label(), action, "action filtered out");
            continue;
        }
        planned.push((action, verbs, CompileContext::resolve(definition, action, &uris)?));
    }

    let registered = planned.len();
    for (action, verbs, ctx) in planned {
        let route = match verbs {
            Methods::Any(verbs) => router.match_any(verbs, &ctx.uri, ctx.target),
            Methods::One(verb) => router.route(*verb, &ctx.uri, ctx.target),
        };

        if let Some(middleware) = middlewares.get(action) {
            route.middleware(middleware);
        }
        if let Some(name) = route_name(definition, &options, &separator, action) {
            route.name(&name);
        }
        if let Some(hook) = definition.as_post_process() {
            hook.collection(route);
        }
    }

    debug!(definition = definition.label(), registered, "compiled route definition");
    Ok(registered)
}

/// Default resource verbs, empty outside resource mode.
pub fn default_methods(options: &RouteOptions) -> ActionTable<Methods> {
    if !options.is_resource {
        return ActionTable::new();
    }
    let verbs: [Methods; 7] = [
        Verb::Get.into(),
        Verb::Get.into(),
        Verb::Post.into(),
        Verb::Get.into(),
        [Verb::Put, Verb::Patch].into(),
        Verb::Delete.into(),
        Verb::Get.into(),
    ];
    RESOURCE_ACTIONS.into_iter().zip(verbs).collect()
}

/// Default resource URL templates, empty outside resource mode.
pub fn default_uris(options: &RouteOptions) -> ActionTable<String> {
    if !options.is_resource {
        return ActionTable::new();
    }
    let member = options.placeholder();
    let uris: [String; 7] = [
        "/".to_string(),
        "/create".to_string(),
        "/".to_string(),
        member.clone(),
        member.clone(),
        member.clone(),
        format!("{member}/edit"),
    ];
    RESOURCE_ACTIONS.into_iter().zip(uris).collect()
}

pub fn method_table(definition: &dyn RouteDefinition, options: &RouteOptions) -> ActionTable<Methods> {
    let defaults = default_methods(options);
    match definition.as_custom_methods() {
        Some(custom) => defaults.merge(custom.methods()),
        None => defaults,
    }
}

pub fn uri_table(definition: &dyn RouteDefinition, options: &RouteOptions) -> ActionTable<String> {
    let defaults = default_uris(options);
    match definition.as_custom_uris() {
        Some(custom) => defaults.merge(custom.uris()),
        None => defaults,
    }
}

fn check_filters(definition: &dyn RouteDefinition, options: &RouteOptions) -> Result<(), RouteError> {
    if !options.only.is_empty() && !options.except.is_empty() {
        return Err(RouteError::ConfigurationConflict {
            definition: definition.label().to_string(),
        });
    }
    Ok(())
}

/// Which actions of the method table may be registered.
#[derive(Debug)]
enum ActionFilter {
    /// Everything except these.
    Except(Vec<String>),
    /// Only these; also used for "all keys of the table".
    Listed(Vec<String>),
}

impl ActionFilter {
    fn resolve(
        definition: &dyn RouteDefinition,
        options: &RouteOptions,
        methods: &ActionTable<Methods>,
    ) -> Result<Self, RouteError> {
        check_filters(definition, options)?;
        if !options.only.is_empty() {
            return Ok(ActionFilter::Listed(options.only.clone()));
        }
        if !options.except.is_empty() {
            return Ok(ActionFilter::Except(options.except.clone()));
        }
        Ok(ActionFilter::Listed(methods.keys().map(str::to_string).collect()))
    }

    fn permits(&self, action: &str) -> bool {
        match self {
            ActionFilter::Except(excluded) => !excluded.iter().any(|a| a == action),
            ActionFilter::Listed(allowed) => allowed.iter().any(|a| a == action),
        }
    }
}

/// Per-action scratch state for one registration.
#[derive(Debug)]
struct CompileContext {
    uri: String,
    target: HandlerTarget,
}

impl CompileContext {
    fn resolve(
        definition: &dyn RouteDefinition,
        action: &str,
        uris: &ActionTable<String>,
    ) -> Result<Self, RouteError> {
        let uri = uris
            .get(action)
            .filter(|uri| !uri.is_empty())
            .cloned()
            .ok_or_else(|| RouteError::UnresolvedAction {
                definition: definition.label().to_string(),
                action: action.to_string(),
            })?;
        let target = handler_target(definition, action)?;
        Ok(Self { uri, target })
    }
}

fn handler_target(definition: &dyn RouteDefinition, action: &str) -> Result<HandlerTarget, RouteError> {
    if let Some(mapping) = definition.as_custom_mapping()
        && let Some((controller, _)) = mapping
            .mapping()
            .into_iter()
            .find(|(_, actions)| actions.iter().any(|a| a == action))
    {
        return Ok(HandlerTarget::new(controller, action));
    }

    definition
        .as_default_controller()
        .map(|c| c.controller())
        .filter(|controller| !controller.is_empty())
        .map(|controller| HandlerTarget::new(controller, action))
        .ok_or_else(|| RouteError::UnresolvedHandler {
            definition: definition.label().to_string(),
            action: action.to_string(),
        })
}

/// Name passed to the router for `action`, if any.
///
/// Wrapped definitions (group or domain) emit `separator + name` and leave the
/// prefix to the group's own name joining; without a group name prefix
/// nothing is emitted.
fn route_name(
    definition: &dyn RouteDefinition,
    options: &RouteOptions,
    separator: &str,
    action: &str,
) -> Option<String> {
    if !options.is_resource {
        return None;
    }
    let name = match definition.as_custom_names() {
        Some(names) => names.name_for(action),
        None => action.to_string(),
    };
    if is_wrapped(options) {
        return options.name.as_ref().map(|_| format!("{separator}{name}"));
    }
    Some(name)
}
