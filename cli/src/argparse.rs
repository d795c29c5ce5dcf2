use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tm_filter::Section;

#[derive(Parser)]
#[command(
    name = "tms",
    about = "Compose, convert and run trademark search filters",
    version,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "tm-search.toml")]
    pub config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Pick which subcommand to use
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available filter strategies
    Strategies(StrategiesArgs),
    /// Print the display text of a query payload
    Render(PayloadArgs),
    /// Convert a query payload between the nested and flat forms
    Convert(ConvertArgs),
    /// Replay an edit script and print the resulting payload
    Apply(ApplyArgs),
    /// Send a query payload to the search backend
    Search(SearchArgs),
}

#[derive(Args)]
pub struct StrategiesArgs {
    /// Only list strategies of one section, e.g. "Filing Status"
    #[arg(long)]
    pub section: Option<Section>,
}

#[derive(Args)]
pub struct PayloadArgs {
    /// Query payload file (nested or flat JSON)
    pub file: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WireForm {
    Nested,
    Flat,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Query payload file (nested or flat JSON)
    pub file: PathBuf,

    /// Output form
    #[arg(long, value_enum, default_value_t = WireForm::Nested)]
    pub to: WireForm,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Edit script (JSON array or YAML list)
    pub script: PathBuf,

    /// Payload to start from instead of an empty query
    #[arg(long)]
    pub start: Option<PathBuf>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Query payload file (nested or flat JSON)
    pub file: PathBuf,

    /// Result page to fetch, defaults to the payload's `page`
    #[arg(long)]
    pub page: Option<u32>,

    /// Results per page; defaults to the payload's `per_page`, then the configured value
    #[arg(long)]
    pub per_page: Option<u32>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
