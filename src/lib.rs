//! # route-definitions
//!
//! Declarative route definitions compiled into router registrations.
//!
//! ## Architecture
//!
//! - **table**: verbs, handler targets and ordered action tables with override-wins merging
//! - **definition**: the `RouteDefinition` trait, its options and optional capabilities
//! - **compiler**: turns one definition into registrations (filters, URLs, handlers, names)
//! - **group**: group and domain wrapping around a definition's routes
//! - **router**: the router contract and `RouteTable`, an in-memory recording router
//! - **scan**: deterministic source file discovery under a root directory
//! - **declarations**: tree-sitter based discovery of declared type names in a file
//! - **registry**: the class map built from a scan
//! - **catalog**: constructors for definitions, keyed by type name
//! - **loader**: constructs discovered definitions and dispatches them into the compiler
//! - **config**: settings resolved from flags, environment and defaults
//! - **error**: error kinds raised while loading and compiling

pub mod catalog;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod declarations;
pub mod definition;
pub mod error;
pub mod group;
pub mod loader;
pub mod registry;
pub mod router;
pub mod scan;
pub mod table;

pub use catalog::Catalog;
pub use config::{FailurePolicy, Settings};
pub use definition::{Resource, RouteDefinition, RouteOptions};
pub use error::RouteError;
pub use loader::{LoadReport, Loader};
pub use router::{Route, RouteTable, Router};
pub use table::{ActionTable, HandlerTarget, Methods, Verb};
