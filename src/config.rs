use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::env;

use crate::cli::Cli;

pub const SEPARATOR_ENV: &str = "ROUTE_DEFINITIONS_SEPARATOR";
pub const POLICY_ENV: &str = "ROUTE_DEFINITIONS_POLICY";
pub const EXTENSIONS_ENV: &str = "ROUTE_DEFINITIONS_EXTENSIONS";

pub const DEFAULT_SEPARATOR: &str = ".";
pub const DEFAULT_EXTENSION: &str = "rs";

/// What the loader does when one definition fails to construct or compile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and keep loading the remaining definitions.
    #[default]
    Continue,
    /// Stop at the first failure and return it.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Joins a group's name prefix and an action's route name.
    pub separator: String,
    pub policy: FailurePolicy,
    /// Source file extensions considered during discovery.
    pub extensions: Vec<String>,
    /// Module path prepended to every discovered type name.
    pub root_module: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            policy: FailurePolicy::default(),
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            root_module: None,
        }
    }
}

/// Flags win over the environment, the environment wins over defaults.
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    resolve_settings_with(cli, |key| env::var(key).ok())
}

pub fn resolve_settings_with(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let defaults = Settings::default();

    let separator = cli
        .separator
        .clone()
        .or_else(|| lookup(SEPARATOR_ENV))
        .unwrap_or(defaults.separator);

    let policy = match cli.policy {
        Some(policy) => policy,
        None => match lookup(POLICY_ENV) {
            Some(raw) => FailurePolicy::from_str(raw.trim(), true)
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| format!("Invalid {POLICY_ENV} value: {raw}"))?,
            None => defaults.policy,
        },
    };

    let extensions = if !cli.extensions.is_empty() {
        normalize_extensions(cli.extensions.iter().map(String::as_str))
    } else if let Some(raw) = lookup(EXTENSIONS_ENV) {
        normalize_extensions(raw.split(','))
    } else {
        defaults.extensions
    };
    if extensions.is_empty() {
        anyhow::bail!("At least one source file extension is required");
    }

    Ok(Settings {
        separator,
        policy,
        extensions,
        root_module: None,
    })
}

fn normalize_extensions<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ext in raw {
        let ext = ext.trim().trim_start_matches('.');
        if !ext.is_empty() && !out.iter().any(|e| e == ext) {
            out.push(ext.to_string());
        }
    }
    out
}
