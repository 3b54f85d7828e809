use anyhow::Result;
use clap::Parser;

use smart_test_manager::cli::{self, Cli};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(cli::Commands::Suites { config }) => {
            cli::handle_suites(config)?;
        }
        Some(cli::Commands::Init { config, force }) => {
            cli::handle_init(config, force)?;
        }
        None => {
            cli::handle_analyze(cli.analyze)?;
        }
    }

    Ok(())
}
