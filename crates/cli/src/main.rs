use anyhow::Context;
use clap::Parser;

use labinv_infra::AppConfig;

mod cli;
mod commands;
mod session;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let mut config = AppConfig::from_env().context("reading configuration from environment")?;
    cli.apply_overrides(&mut config)?;

    if cli.verbose {
        labinv_observability::tracing::init(config.log_format, "debug");
    } else {
        labinv_observability::init(config.log_format);
    }
    tracing::debug!(data_file = %config.data_file.display(), app_url = %config.app_url, "configuration loaded");

    commands::run_command(cli, config)
}
