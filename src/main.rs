use anyhow::{Context, Result};
use clap::Parser;
use route_definitions::cli::{Cli, Commands, OutputFormat};
use route_definitions::compiler;
use route_definitions::config::resolve_settings;
use route_definitions::definition::{Resource, RouteOptions};
use route_definitions::registry::{ClassMap, ScanOptions, class_map};
use route_definitions::router::{RegisteredRoute, RouteTable};
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut settings = resolve_settings(&cli)?;

    match cli.command.clone() {
        Commands::Scan {
            dir,
            root_module,
            format,
        } => {
            settings.root_module = root_module;
            let map = class_map(&dir, &ScanOptions::from(&settings))
                .with_context(|| format!("Failed to scan {}", dir.display()))?;
            write_output(&render_class_map(&map, format)?)?;
        }
        Commands::Resource {
            controller,
            name,
            prefix,
            parameter,
            middleware,
            namespace,
            domain,
            only,
            except,
            no_group,
            format,
        } => {
            let mut options = RouteOptions::default()
                .group(!no_group)
                .middleware(middleware)
                .only(only)
                .except(except);
            options.name = name;
            options.prefix = prefix;
            options.parameter = parameter;
            options.namespace = namespace;
            options.domain = domain;

            let definition = Resource::new(controller, options);
            let mut table = RouteTable::new();
            compiler::routes(&definition, &mut table, &settings)
                .context("Failed to compile resource")?;
            write_output(&render_routes(table.routes(), format)?)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render_class_map(map: &ClassMap, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(map)?,
        OutputFormat::Text => {
            let mut out = String::new();
            for entry in map.iter() {
                out.push_str(&format!("{} {}\n", entry.name, entry.path.display()));
            }
            out
        }
    })
}

fn render_routes(routes: &[RegisteredRoute], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(routes)?,
        OutputFormat::Text => {
            let mut out = String::new();
            for route in routes {
                let verbs: Vec<&str> = route.methods.iter().map(|v| v.as_str()).collect();
                out.push_str(&format!(
                    "{:<12} {:<28} {:<24} {}\n",
                    verbs.join("|"),
                    route.uri,
                    route.name.as_deref().unwrap_or("-"),
                    route.action
                ));
            }
            out
        }
    })
}

fn write_output(content: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_definitions::table::{HandlerTarget, Verb};

    #[test]
    fn text_routes_list_verbs_uri_name_and_action() {
        let mut table = RouteTable::new();
        let definition = Resource::new(
            "UserController",
            RouteOptions::default().name("users").prefix("/users").only(["update"]),
        );
        compiler::routes(&definition, &mut table, &Default::default()).unwrap();

        let text = render_routes(table.routes(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("PUT|PATCH"));
        assert!(text.contains("/users/{id}"));
        assert!(text.contains("users.update"));
        assert!(text.contains(&HandlerTarget::new("UserController", "update").to_string()));
        assert_eq!(table.routes()[0].methods, vec![Verb::Put, Verb::Patch]);
    }

    #[test]
    fn text_class_map_lists_one_entry_per_line() {
        let mut map = ClassMap::new();
        map.insert("routes::Users", "/src/routes.rs");
        map.insert("routes::Posts", "/src/routes.rs");
        let text = render_class_map(&map, OutputFormat::Text).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("routes::Users /src/routes.rs"));
    }
}
