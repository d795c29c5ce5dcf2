mod query;
mod search;
mod strategies;

use crate::argparse::Commands;
use anyhow::{Context, Result};
use std::path::Path;
use tm_search::Config;

pub use query::{handle_apply_command, handle_convert_command, handle_render_command};
pub use search::handle_search_command;
pub use strategies::handle_strategies_command;

pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let registry = config.registry();

    match command {
        Commands::Strategies(args) => handle_strategies_command(args, &registry),
        Commands::Render(args) => handle_render_command(args, &registry),
        Commands::Convert(args) => handle_convert_command(args),
        Commands::Apply(args) => handle_apply_command(args, &registry, config),
        Commands::Search(args) => handle_search_command(args, &registry, config).await,
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
