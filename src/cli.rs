use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::FailurePolicy;

#[derive(Debug, Clone, Parser)]
#[command(name = "route-definitions")]
#[command(about = "Discover route definition types and preview the routes they compile to")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "SEP")]
    pub separator: Option<String>,

    #[arg(long, value_enum, value_name = "POLICY")]
    pub policy: Option<FailurePolicy>,

    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Print the class map of a source tree.
    Scan {
        dir: PathBuf,

        #[arg(long, value_name = "MODULE")]
        root_module: Option<String>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Compile a single-controller resource and print its routes.
    Resource {
        controller: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        prefix: Option<String>,

        #[arg(long)]
        parameter: Option<String>,

        #[arg(long, value_delimiter = ',')]
        middleware: Vec<String>,

        #[arg(long)]
        namespace: Option<String>,

        #[arg(long)]
        domain: Option<String>,

        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        except: Vec<String>,

        #[arg(long)]
        no_group: bool,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
