mod app;
mod cli;
mod config;
mod db;
mod logging;
mod model;
mod paths;
mod retry;
mod store;

use anyhow::Result;
use clap::Parser;

use crate::config::Config;
use crate::paths::config_file_path;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config_file_path()?,
    };
    let config = Config::load(&config_path)?;
    logging::init(&config.log_level);
    app::run(cli, &config)
}
