use std::path::PathBuf;

use c2r_core::IncludeMatch;
use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Translate every test-<project>.c unit under the input directory
    Run(RunArgs),
    /// List the translation units found under the input directory
    Discover(DiscoverArgs),
    /// Print the bundle one unit would send, without contacting the service
    Bundle(BundleArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Directory holding the C sources
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory receiving one subdirectory per unit (created if missing)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Maximum number of units translated at once
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Include matching mode: exact or prefix
    #[arg(short = 'm', long = "match")]
    pub include_match: Option<IncludeMatch>,

    /// Unit output directory template, e.g. "{project}" or "main"
    #[arg(long)]
    pub unit_dir: Option<String>,

    /// Translation service base URL
    #[arg(long)]
    pub service_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Directory holding the C sources
    #[arg(short, long)]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct BundleArgs {
    /// Directory holding the C sources
    #[arg(short, long)]
    pub input: PathBuf,

    /// Project name of the unit (test-<project>.c)
    pub project: String,

    /// Include matching mode: exact or prefix
    #[arg(short = 'm', long = "match")]
    pub include_match: Option<IncludeMatch>,
}
