//! Constructors for route definitions, keyed by fully-qualified type name.
//!
//! Rust cannot instantiate a type from its name, so every definition that may
//! be discovered is registered here up front. Names the scanner finds that are
//! not in the catalog are support types and are left alone by the loader.

use anyhow::Result;
use std::collections::HashMap;
use std::fmt;

use crate::definition::RouteDefinition;

pub type Constructor = Box<dyn Fn() -> Result<Box<dyn RouteDefinition>> + Send + Sync>;

#[derive(Default)]
pub struct Catalog {
    constructors: HashMap<String, Constructor>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Catalog").field("definitions", &names).finish()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `name`, replacing any earlier entry.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn() -> Result<Box<dyn RouteDefinition>> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
        self
    }

    pub fn register_default<T>(&mut self, name: impl Into<String>) -> &mut Self
    where
        T: RouteDefinition + Default + 'static,
    {
        self.register(name, || Ok(Box::new(T::default()) as Box<dyn RouteDefinition>))
    }

    /// `None` when `name` is not a registered definition.
    pub fn construct(&self, name: &str) -> Option<Result<Box<dyn RouteDefinition>>> {
        self.constructors.get(name).map(|construct| construct())
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::RouteOptions;

    #[derive(Default)]
    struct Photos;

    impl RouteDefinition for Photos {
        fn options(&self) -> RouteOptions {
            RouteOptions::default().name("photos")
        }
    }

    #[test]
    fn construct_distinguishes_unknown_failing_and_valid_entries() {
        let mut catalog = Catalog::new();
        catalog
            .register_default::<Photos>("app::Photos")
            .register("app::Broken", || anyhow::bail!("missing database handle"));

        assert!(catalog.construct("app::Support").is_none());

        let broken = catalog.construct("app::Broken").unwrap();
        assert!(broken.is_err());

        let photos = catalog.construct("app::Photos").unwrap().unwrap();
        assert_eq!(photos.options().name.as_deref(), Some("photos"));
        assert_eq!(catalog.len(), 2);
        assert!(format!("{catalog:?}").contains("app::Photos"));
    }
}
