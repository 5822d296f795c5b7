use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering, constructing or compiling route definitions.
///
/// Everything here is a boot-time configuration problem; none of these can
/// happen once routes are registered.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("{definition}: `except` and `only` cannot be declared at the same time")]
    ConfigurationConflict { definition: String },

    #[error(
        "{definition}: the '{action}' action doesn't have a URL, add it to the custom URL table"
    )]
    UnresolvedAction { definition: String, action: String },

    #[error(
        "{definition}: the '{action}' action doesn't have a handler, provide a default controller or map it explicitly"
    )]
    UnresolvedHandler { definition: String, action: String },

    #[error("failed to construct {type_name}: {reason}")]
    Instantiation { type_name: String, reason: String },

    #[error("unknown HTTP verb: {0}")]
    UnknownVerb(String),

    #[error("cannot scan {}: {reason}", root.display())]
    Scan { root: PathBuf, reason: String },
}
