mod argparse;
mod commands;
mod utils;

use anyhow::Result;
use argparse::parse_args;
use tm_search::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args();

    // Load .env file if it exists, so RUST_LOG from it reaches the logger
    dotenv::dotenv().ok();
    utils::init_logger(cli.verbose);

    let config = Config::resolve(&cli.config)?;
    commands::handle_command(cli.command, &config).await
}
