//! smokeping-operator CLI entry point.

use std::path::Path;

use clap::Parser;

use smokeping_operator::cli::{commands, handle_error, Cli, Commands};
use smokeping_operator::infrastructure::config::{ConfigLoader, CONFIG_DIR};
use smokeping_operator::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load_layered(Path::new(CONFIG_DIR), cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Event(args) => commands::event::execute(args, config, cli.json).await,
        Commands::Action(action) => commands::action::execute(action, config, cli.json).await,
        Commands::Serve => commands::serve::execute(config, cli.json).await,
        Commands::Status => commands::status::execute(config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
