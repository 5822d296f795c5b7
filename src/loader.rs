//! Discovery-driven loading: construct every known definition and dispatch it
//! into the compiler, in discovery order.
//!
//! A failing definition never takes the others down under
//! [`FailurePolicy::Continue`]; it is logged and listed in the [`LoadReport`].
//! Under [`FailurePolicy::Abort`] the first failure is returned as is.

use serde::Serialize;
use std::path::Path;
use tracing::{info, trace, warn};

use crate::catalog::Catalog;
use crate::compiler;
use crate::config::{FailurePolicy, Settings};
use crate::definition::RouteDefinition;
use crate::error::RouteError;
use crate::registry::{ScanOptions, class_map};
use crate::router::Router;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<LoadedDefinition>,
    /// Discovered names that are not registered definitions.
    pub skipped: Vec<String>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn routes(&self) -> usize {
        self.loaded.iter().map(|d| d.routes).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedDefinition {
    pub name: String,
    pub routes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub name: String,
    pub error: String,
}

#[derive(Debug)]
pub struct Loader {
    catalog: Catalog,
    settings: Settings,
}

impl Loader {
    pub fn new(catalog: Catalog, settings: Settings) -> Self {
        Self { catalog, settings }
    }

    /// Constructs and registers the named definitions, in the given order.
    pub fn load<I, S>(&self, router: &mut dyn Router, names: I) -> Result<LoadReport, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = LoadReport::default();
        if self.catalog.is_empty() {
            warn!("catalog has no route definitions, nothing will be registered");
        } else {
            trace!(definitions = self.catalog.len(), "loading route definitions");
        }

        for name in names {
            let name = name.as_ref();
            let definition = match self.catalog.construct(name) {
                None => {
                    trace!(name, "not a route definition");
                    report.skipped.push(name.to_string());
                    continue;
                }
                Some(Err(err)) => Err(RouteError::Instantiation {
                    type_name: name.to_string(),
                    reason: format!("{err:#}"),
                }),
                Some(Ok(definition)) => Ok(definition),
            };

            let outcome = match definition {
                Ok(definition) => self.dispatch(definition.as_ref(), router),
                Err(err) => Err(err),
            };
            match outcome {
                Ok(routes) => {
                    info!(name, routes, "registered route definition");
                    report.loaded.push(LoadedDefinition {
                        name: name.to_string(),
                        routes,
                    });
                }
                Err(err) => {
                    if self.settings.policy == FailurePolicy::Abort {
                        return Err(err);
                    }
                    warn!(name, error = %err, "route definition failed, continuing");
                    report.failures.push(LoadFailure {
                        name: name.to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Scans `root` for type declarations and loads them in discovery order.
    pub fn load_all(&self, router: &mut dyn Router, root: &Path) -> Result<LoadReport, RouteError> {
        let map = class_map(root, &ScanOptions::from(&self.settings))?;
        if map.is_empty() {
            warn!(root = %root.display(), "no type declarations found");
        }
        info!(root = %root.display(), types = map.len(), "discovered type declarations");
        self.load(router, map.names())
    }

    fn dispatch(
        &self,
        definition: &dyn RouteDefinition,
        router: &mut dyn Router,
    ) -> Result<usize, RouteError> {
        let mut routes = compiler::routes(definition, router, &self.settings)?;
        if let Some(fallback) = definition.as_fallback() {
            router.fallback(fallback.fallback());
            routes += 1;
        }
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Fallback, Resource, RouteOptions};
    use crate::router::RouteTable;
    use crate::router::recording::{Call, RecordingRouter};
    use crate::table::HandlerTarget;

    fn boxed(resource: Resource) -> anyhow::Result<Box<dyn RouteDefinition>> {
        let definition: Box<dyn RouteDefinition> = Box::new(resource);
        Ok(definition)
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .register("app::Photos", || {
                boxed(Resource::new(
                    "PhotoController",
                    RouteOptions::default().name("photos").prefix("/photos"),
                ))
            })
            .register("app::Broken", || anyhow::bail!("requires a database pool"))
            .register("app::Conflicted", || {
                boxed(Resource::new(
                    "TagController",
                    RouteOptions::default().only(["index"]).except(["show"]),
                ))
            })
            .register("app::Videos", || {
                boxed(Resource::new(
                    "VideoController",
                    RouteOptions::default().name("videos").only(["index", "show"]),
                ))
            });
        catalog
    }

    #[test]
    fn one_failing_definition_does_not_stop_the_rest() {
        let loader = Loader::new(catalog(), Settings::default());
        let mut table = RouteTable::new();

        let report = loader
            .load(
                &mut table,
                ["app::Broken", "app::Photos", "app::Conflicted", "app::Videos"],
            )
            .unwrap();

        assert_eq!(
            report.loaded.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            vec!["app::Photos", "app::Videos"]
        );
        assert_eq!(report.routes(), 9);
        assert_eq!(table.len(), 9);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].name, "app::Broken");
        assert!(report.failures[0].error.contains("requires a database pool"));
        assert!(report.failures[1].error.contains("except"));
        assert!(!report.is_clean());
    }

    #[test]
    fn unknown_names_are_skipped_silently() {
        let loader = Loader::new(catalog(), Settings::default());
        let mut table = RouteTable::new();

        let report = loader.load(&mut table, ["app::PhotoFilters", "app::Videos"]).unwrap();
        assert_eq!(report.skipped, vec!["app::PhotoFilters"]);
        assert!(report.is_clean());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn abort_policy_returns_the_first_failure() {
        let settings = Settings {
            policy: FailurePolicy::Abort,
            ..Settings::default()
        };
        let loader = Loader::new(catalog(), settings);
        let mut table = RouteTable::new();

        let err = loader
            .load(&mut table, ["app::Photos", "app::Broken", "app::Videos"])
            .unwrap_err();
        assert!(matches!(err, RouteError::Instantiation { ref type_name, .. } if type_name == "app::Broken"));
        assert_eq!(table.len(), 7);
    }

    #[derive(Default)]
    struct Pages;

    impl RouteDefinition for Pages {
        fn options(&self) -> RouteOptions {
            RouteOptions::default().resource(false).group(false)
        }
        fn as_fallback(&self) -> Option<&dyn Fallback> {
            Some(self)
        }
    }

    impl Fallback for Pages {
        fn fallback(&self) -> HandlerTarget {
            HandlerTarget::new("PageController", "missing")
        }
    }

    #[test]
    fn fallback_is_registered_after_the_definition() {
        let mut catalog = catalog();
        catalog.register_default::<Pages>("app::Pages");
        let loader = Loader::new(catalog, Settings::default());
        let mut router = RecordingRouter::default();

        let report = loader.load(&mut router, ["app::Videos", "app::Pages"]).unwrap();
        assert_eq!(router.calls.last(), Some(&Call::Fallback));
        assert_eq!(report.loaded[1].routes, 1);
        assert_eq!(
            router.table().routes().last().map(|r| r.action.clone()),
            Some(HandlerTarget::new("PageController", "missing"))
        );
    }
}
